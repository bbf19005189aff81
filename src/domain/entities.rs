//! Domain entities: core data structures

use serde::{Deserialize, Serialize};

/// Label shown for nodes that carry neither a key nor a name.
pub const UNNAMED_LABEL: &str = "unnamed";

/// A product attached to a category.
///
/// Field names follow the catalog backend's JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub nome: String,
    #[serde(default)]
    pub preco: f64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub descricao: String,
    /// Rating from 0 to 5
    #[serde(default)]
    pub avaliacao: f64,
}

impl Product {
    pub fn new(id: u64, nome: impl Into<String>, preco: f64, avaliacao: f64) -> Self {
        Self {
            id,
            nome: nome.into(),
            preco,
            descricao: String::new(),
            avaliacao,
        }
    }
}

/// Payload of a tree node: the category record and its products.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub descricao: String,
    #[serde(default)]
    pub produtos: Vec<Product>,
}

impl Category {
    pub fn new(nome: impl Into<String>, descricao: impl Into<String>) -> Self {
        Self {
            nome: nome.into(),
            descricao: descricao.into(),
            produtos: Vec::new(),
        }
    }

    pub fn with_products(mut self, produtos: Vec<Product>) -> Self {
        self.produtos = produtos;
        self
    }
}

/// One node of the pre-built category tree.
///
/// `height` and `balance_factor` are carried as supplied; nothing in this
/// crate recomputes them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(default)]
    pub key: Option<String>,
    /// Alternate display name used by some producers when `key` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub balance_factor: i32,
    #[serde(default)]
    pub data: Option<Category>,
    #[serde(default)]
    pub left_child: Option<Box<TreeNode>>,
    #[serde(default)]
    pub right_child: Option<Box<TreeNode>>,
}

impl TreeNode {
    /// Create a childless node keyed by `key`, with an empty category named after it.
    pub fn leaf(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            data: Some(Category::new(key.clone(), "")),
            key: Some(key),
            height: 1,
            ..Self::default()
        }
    }

    pub fn with_height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    pub fn with_balance_factor(mut self, balance_factor: i32) -> Self {
        self.balance_factor = balance_factor;
        self
    }

    pub fn with_data(mut self, data: Category) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_left(mut self, child: TreeNode) -> Self {
        self.left_child = Some(Box::new(child));
        self
    }

    pub fn with_right(mut self, child: TreeNode) -> Self {
        self.right_child = Some(Box::new(child));
        self
    }

    pub fn has_children(&self) -> bool {
        self.left_child.is_some() || self.right_child.is_some()
    }

    /// Display label: key, then name, then a placeholder.
    pub fn label(&self) -> &str {
        self.key
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or(UNNAMED_LABEL)
    }

    pub fn product_count(&self) -> usize {
        self.data.as_ref().map_or(0, |d| d.produtos.len())
    }
}

/// A whole category tree as handed over by the catalog backend (`{"root": ...}`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryTree {
    #[serde(default)]
    pub root: Option<TreeNode>,
}

impl CategoryTree {
    pub fn new(root: TreeNode) -> Self {
        Self { root: Some(root) }
    }

    pub fn empty() -> Self {
        Self { root: None }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }
}

/// The static sample catalog shown when no tree file is configured.
pub fn sample_tree() -> CategoryTree {
    let esportes = TreeNode::leaf("Esportes").with_data(
        Category::new("Esportes", "equipamentos esportivos")
            .with_products(vec![Product::new(4, "Tenis Running", 299.0, 4.6)]),
    );
    let alimentos = TreeNode::leaf("Alimentos")
        .with_height(2)
        .with_balance_factor(-1)
        .with_data(
            Category::new("Alimentos", "produtos alimenticios")
                .with_products(vec![Product::new(3, "Cafe Premium", 25.0, 4.7)]),
        )
        .with_right(esportes);
    let livros = TreeNode::leaf("Livros").with_data(
        Category::new("Livros", "literatura e educacao")
            .with_products(vec![Product::new(6, "Python Avancado", 89.90, 4.9)]),
    );
    let roupas = TreeNode::leaf("Roupas")
        .with_height(2)
        .with_balance_factor(1)
        .with_data(
            Category::new("Roupas", "vestuario e acessorios")
                .with_products(vec![Product::new(5, "Camiseta", 49.90, 4.2)]),
        )
        .with_left(livros);

    CategoryTree::new(
        TreeNode::leaf("Eletronicos")
            .with_height(3)
            .with_data(
                Category::new("Eletronicos", "dispositivos eletronicos").with_products(vec![
                    Product::new(1, "Smartphone", 1500.0, 4.5),
                    Product::new(2, "Notebook", 3000.0, 4.8),
                ]),
            )
            .with_left(alimentos)
            .with_right(roupas),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_backend_json_when_deserializing_then_reads_camel_case_children() {
        let json = r#"{
            "root": {
                "key": "Eletronicos",
                "height": 2,
                "data": {"nome": "Eletronicos", "descricao": "x", "produtos": [
                    {"id": 1, "nome": "Smartphone", "preco": 1500, "avaliacao": 4.5}
                ]},
                "leftChild": {"key": "Alimentos", "height": 1, "leftChild": null, "rightChild": null},
                "rightChild": null
            }
        }"#;

        let tree: CategoryTree = serde_json::from_str(json).unwrap();
        let root = tree.root.expect("root");
        assert_eq!(root.label(), "Eletronicos");
        assert_eq!(root.product_count(), 1);
        assert_eq!(root.left_child.as_ref().unwrap().label(), "Alimentos");
        assert!(root.right_child.is_none());
        assert_eq!(root.balance_factor, 0);
    }

    #[test]
    fn given_node_without_key_when_labelling_then_falls_back() {
        let named = TreeNode {
            name: Some("Outros".into()),
            ..TreeNode::default()
        };
        assert_eq!(named.label(), "Outros");
        assert_eq!(TreeNode::default().label(), UNNAMED_LABEL);
    }

    #[test]
    fn given_sample_tree_then_has_five_categories() {
        let tree = sample_tree();
        let root = tree.root.as_ref().unwrap();
        assert_eq!(root.label(), "Eletronicos");
        assert!(root.has_children());
        let alimentos = root.left_child.as_ref().unwrap();
        assert!(alimentos.left_child.is_none());
        assert_eq!(alimentos.right_child.as_ref().unwrap().label(), "Esportes");
        let roupas = root.right_child.as_ref().unwrap();
        assert_eq!(roupas.left_child.as_ref().unwrap().label(), "Livros");
        assert!(roupas.right_child.is_none());
    }
}
