use generational_arena::{Arena, Index};
use serde::Serialize;
use std::fmt;
use tracing::instrument;

use crate::domain::entities::{Category, CategoryTree, Product, TreeNode};

/// Which child slot of a binary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn marker(self) -> char {
        match self {
            Side::Left => 'L',
            Side::Right => 'R',
        }
    }

    /// Horizontal direction of this side: -1 for left, +1 for right.
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }
}

/// Data payload for arena nodes representing categories.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub key: Option<String>,
    /// Resolved display label (key, name or placeholder)
    pub label: String,
    /// Declared height, as supplied
    pub height: u32,
    /// Declared balance factor, as supplied
    pub balance_factor: i32,
    pub category: Category,
}

impl NodeData {
    fn from_tree_node(node: &TreeNode) -> Self {
        Self {
            key: node.key.clone(),
            label: node.label().to_string(),
            height: node.height,
            balance_factor: node.balance_factor,
            category: node.data.clone().unwrap_or_default(),
        }
    }

    pub fn product_count(&self) -> usize {
        self.category.produtos.len()
    }
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Binary tree node in the arena.
#[derive(Debug)]
pub struct CategoryNode {
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    pub left: Option<Index>,
    pub right: Option<Index>,
}

impl CategoryNode {
    pub fn child(&self, side: Side) -> Option<Index> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Present children in left-to-right order.
    pub fn children(&self) -> impl Iterator<Item = (Side, Index)> + '_ {
        [(Side::Left, self.left), (Side::Right, self.right)]
            .into_iter()
            .filter_map(|(side, idx)| idx.map(|i| (side, i)))
    }

    pub fn has_children(&self) -> bool {
        self.left.is_some() || self.right.is_some()
    }
}

/// A node whose declared height or balance factor disagrees with its shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceMismatch {
    pub label: String,
    pub declared_height: u32,
    pub actual_height: u32,
    pub declared_balance: i32,
    pub actual_balance: i32,
}

/// Arena-based category tree.
///
/// Built once from the nested input tree; immutable afterwards. Generational
/// indices let rendered records refer back to their source node.
#[derive(Debug)]
pub struct CategoryArena {
    arena: Arena<CategoryNode>,
    root: Option<Index>,
}

impl Default for CategoryArena {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Copy a nested tree into the arena, preserving left/right slots.
    #[instrument(level = "debug", skip(tree))]
    pub fn from_tree(tree: &CategoryTree) -> Self {
        let mut arena = Self::new();
        if let Some(root) = &tree.root {
            let mut stack: Vec<(&TreeNode, Option<(Index, Side)>)> = vec![(root, None)];
            while let Some((node, slot)) = stack.pop() {
                let idx = arena.insert_node(NodeData::from_tree_node(node), slot);
                if let Some(right) = &node.right_child {
                    stack.push((right, Some((idx, Side::Right))));
                }
                if let Some(left) = &node.left_child {
                    stack.push((left, Some((idx, Side::Left))));
                }
            }
        }
        arena
    }

    /// Insert a node. `slot` names the parent and side; `None` makes it the root.
    #[instrument(level = "trace", skip(self, data), fields(label = %data.label))]
    pub fn insert_node(&mut self, data: NodeData, slot: Option<(Index, Side)>) -> Index {
        let node = CategoryNode {
            data,
            parent: slot.map(|(parent, _)| parent),
            left: None,
            right: None,
        };
        let node_idx = self.arena.insert(node);

        if let Some((parent_idx, side)) = slot {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                match side {
                    Side::Left => parent.left = Some(node_idx),
                    Side::Right => parent.right = Some(node_idx),
                }
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&CategoryNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order traversal (node, left, right).
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    /// Pre-order traversal of the subtree rooted at `idx`.
    pub fn iter_from(&self, idx: Index) -> TreeIterator<'_> {
        TreeIterator::new(self, Some(idx))
    }

    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.root.map_or(0, |root| self.calculate_depth(Some(root)) as usize)
    }

    fn calculate_depth(&self, node_idx: Option<Index>) -> u32 {
        match node_idx.and_then(|idx| self.get_node(idx)) {
            Some(node) => 1 + self.calculate_depth(node.left).max(self.calculate_depth(node.right)),
            None => 0,
        }
    }

    /// Labels of all leaf nodes, left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_nodes(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| !node.has_children())
            .map(|(_, node)| node.data.label.clone())
            .collect()
    }

    /// First node (pre-order) whose key equals `key`.
    pub fn find_by_key(&self, key: &str) -> Option<Index> {
        self.iter()
            .find(|(_, node)| node.data.key.as_deref() == Some(key))
            .map(|(idx, _)| idx)
    }

    /// Products of the node at `idx` and all of its descendants, depth-first.
    #[instrument(level = "debug", skip(self))]
    pub fn collect_products(&self, idx: Index) -> Vec<&Product> {
        self.iter_from(idx)
            .flat_map(|(_, node)| node.data.category.produtos.iter())
            .collect()
    }

    /// Compare declared height/balance factor with values derived from the shape.
    ///
    /// A leaf has height 1; balance factor is left height minus right height.
    #[instrument(level = "debug", skip(self))]
    pub fn audit_balance(&self) -> Vec<BalanceMismatch> {
        self.iter()
            .filter_map(|(_, node)| {
                let left = self.calculate_depth(node.left);
                let right = self.calculate_depth(node.right);
                let actual_height = 1 + left.max(right);
                let actual_balance = left as i32 - right as i32;
                if actual_height != node.data.height || actual_balance != node.data.balance_factor
                {
                    Some(BalanceMismatch {
                        label: node.data.label.clone(),
                        declared_height: node.data.height,
                        actual_height,
                        declared_balance: node.data.balance_factor,
                        actual_balance,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}

pub struct TreeIterator<'a> {
    arena: &'a CategoryArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a CategoryArena, start: Option<Index>) -> Self {
        Self {
            arena,
            stack: start.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a CategoryNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Right first so left is visited first
                self.stack.extend(node.right);
                self.stack.extend(node.left);
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::sample_tree;

    #[test]
    fn given_sample_tree_when_building_arena_then_preserves_shape() {
        let arena = CategoryArena::from_tree(&sample_tree());

        assert_eq!(arena.len(), 5);
        assert_eq!(arena.depth(), 3);
        let labels: Vec<_> = arena.iter().map(|(_, n)| n.data.label.clone()).collect();
        assert_eq!(
            labels,
            vec!["Eletronicos", "Alimentos", "Esportes", "Roupas", "Livros"]
        );
        assert_eq!(arena.leaf_nodes(), vec!["Esportes", "Livros"]);
    }

    #[test]
    fn given_child_when_inspecting_then_parent_link_and_side_are_set() {
        let arena = CategoryArena::from_tree(&sample_tree());
        let root_idx = arena.root().unwrap();
        let root = arena.get_node(root_idx).unwrap();
        let alimentos_idx = root.child(Side::Left).unwrap();
        let alimentos = arena.get_node(alimentos_idx).unwrap();

        assert_eq!(alimentos.parent, Some(root_idx));
        assert!(alimentos.left.is_none());
        let sides: Vec<_> = alimentos.children().map(|(side, _)| side).collect();
        assert_eq!(sides, vec![Side::Right]);
    }

    #[test]
    fn given_empty_tree_then_arena_is_empty() {
        let arena = CategoryArena::from_tree(&CategoryTree::empty());
        assert!(arena.is_empty());
        assert_eq!(arena.depth(), 0);
        assert!(arena.root().is_none());
        assert!(arena.leaf_nodes().is_empty());
    }

    #[test]
    fn given_key_when_collecting_products_then_includes_descendants() {
        let arena = CategoryArena::from_tree(&sample_tree());
        let idx = arena.find_by_key("Alimentos").unwrap();
        let names: Vec<_> = arena
            .collect_products(idx)
            .iter()
            .map(|p| p.nome.as_str())
            .collect();
        assert_eq!(names, vec!["Cafe Premium", "Tenis Running"]);
        assert!(arena.find_by_key("Brinquedos").is_none());
    }

    #[test]
    fn given_sample_tree_when_auditing_then_declared_values_match() {
        let arena = CategoryArena::from_tree(&sample_tree());
        assert!(arena.audit_balance().is_empty());
    }

    #[test]
    fn given_stale_height_when_auditing_then_reports_without_changing() {
        let tree = CategoryTree::new(
            TreeNode::leaf("A")
                .with_height(5)
                .with_left(TreeNode::leaf("B")),
        );
        let arena = CategoryArena::from_tree(&tree);

        let mismatches = arena.audit_balance();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].label, "A");
        assert_eq!(mismatches[0].actual_height, 2);
        assert_eq!(mismatches[0].actual_balance, 1);
        let root = arena.get_node(arena.root().unwrap()).unwrap();
        assert_eq!(root.data.height, 5);
    }
}
