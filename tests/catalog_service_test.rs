//! Tests for CatalogService: tree loading, recommendations and summaries

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use cattree::application::services::CatalogService;
use cattree::application::ApplicationError;
use cattree::config::Settings;
use cattree::domain::{sample_tree, CategoryTree, TreeNode};
use cattree::infrastructure::di::ServiceContainer;
use cattree::infrastructure::traits::RealFileSystem;
use cattree::util::testing;

fn service() -> CatalogService {
    testing::init_test_setup();
    CatalogService::new(Arc::new(RealFileSystem))
}

fn write_tree(dir: &TempDir, json: &str) -> PathBuf {
    let path = dir.path().join("tree.json");
    fs::write(&path, json).unwrap();
    path
}

const BACKEND_TREE: &str = r#"{
    "root": {
        "key": "Casa",
        "height": 2,
        "balanceFactor": 1,
        "data": {"nome": "Casa", "descricao": "utilidades", "produtos": [
            {"id": 10, "nome": "Panela", "preco": 120.5, "descricao": "inox", "avaliacao": 4.4}
        ]},
        "leftChild": {
            "key": "Jardim",
            "height": 1,
            "balanceFactor": 0,
            "data": {"nome": "Jardim", "descricao": "", "produtos": [
                {"id": 11, "nome": "Mangueira", "preco": 60, "avaliacao": 3.9}
            ]},
            "leftChild": null,
            "rightChild": null
        },
        "rightChild": null
    }
}"#;

// ============================================================
// load
// ============================================================

#[test]
fn given_no_tree_file_when_loading_then_returns_sample_catalog() {
    let tree = service().load(None).unwrap();
    assert_eq!(tree, sample_tree());
}

#[test]
fn given_backend_json_when_loading_then_parses_nodes_and_products() {
    let dir = TempDir::new().unwrap();
    let path = write_tree(&dir, BACKEND_TREE);

    let tree = service().load(Some(&path)).unwrap();

    let root = tree.root.as_ref().unwrap();
    assert_eq!(root.label(), "Casa");
    assert_eq!(root.balance_factor, 1);
    assert_eq!(root.product_count(), 1);
    let jardim = root.left_child.as_ref().unwrap();
    assert_eq!(jardim.label(), "Jardim");
    let produtos = &jardim.data.as_ref().unwrap().produtos;
    assert_eq!(produtos[0].descricao, "");
    assert_eq!(produtos[0].preco, 60.0);
}

#[test]
fn given_null_root_when_loading_then_returns_empty_tree() {
    let dir = TempDir::new().unwrap();
    let path = write_tree(&dir, r#"{"root": null}"#);

    let tree = service().load(Some(&path)).unwrap();

    assert!(tree.is_empty());
}

#[test]
fn given_missing_file_when_loading_then_reports_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    let err = service().load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::TreeFileNotFound(p) if p == path));
}

#[rstest]
#[case::not_json("this is not json")]
#[case::wrong_shape(r#"{"root": {"key": 42}}"#)]
#[case::truncated(r#"{"root": {"key": "A", "leftChild": "#)]
fn given_malformed_file_when_loading_then_reports_invalid_tree(#[case] content: &str) {
    let dir = TempDir::new().unwrap();
    let path = write_tree(&dir, content);

    let err = service().load(Some(&path)).unwrap_err();

    assert!(matches!(err, ApplicationError::InvalidTreeFile { .. }));
    assert!(err.to_string().contains("tree.json"));
}

#[test]
fn given_settings_with_tree_file_when_container_loads_then_uses_file() {
    let dir = TempDir::new().unwrap();
    let path = write_tree(&dir, BACKEND_TREE);
    let settings = Settings {
        tree_file: Some(path),
        ..Settings::default()
    };

    testing::init_test_setup();
    let container = ServiceContainer::new(settings);
    let tree = container.load_tree().unwrap();
    let mut engine = container.scene_engine(&tree).unwrap();
    engine.render_root().unwrap();

    assert_eq!(engine.records().keys().next().unwrap().as_str(), "Casa");
}

// ============================================================
// recommend
// ============================================================

#[rstest]
#[case::root("Eletronicos", vec![1, 2, 3, 4, 5, 6])]
#[case::left_subtree("Alimentos", vec![3, 4])]
#[case::right_subtree("Roupas", vec![5, 6])]
#[case::leaf("Livros", vec![6])]
#[case::unknown("Brinquedos", vec![])]
fn given_sample_tree_when_recommending_then_collects_subtree_products_depth_first(
    #[case] key: &str,
    #[case] expected: Vec<u64>,
) {
    let products = service().recommend(&sample_tree(), key);

    let ids: Vec<u64> = products.iter().map(|p| p.id).collect();
    assert_eq!(ids, expected);
}

#[test]
fn given_empty_tree_when_recommending_then_returns_nothing() {
    assert!(service()
        .recommend(&CategoryTree::empty(), "Eletronicos")
        .is_empty());
}

// ============================================================
// summarize
// ============================================================

#[test]
fn given_sample_tree_when_summarizing_then_reports_shape_without_mismatches() {
    let summary = service().summarize(&sample_tree());

    assert_eq!(summary.nodes, 5);
    assert_eq!(summary.depth, 3);
    assert_eq!(summary.leaves, vec!["Esportes", "Livros"]);
    assert!(summary.balance_mismatches.is_empty());
}

#[test]
fn given_stale_balance_data_when_summarizing_then_reports_mismatch() {
    let tree = CategoryTree::new(
        TreeNode::leaf("A")
            .with_height(5)
            .with_balance_factor(2)
            .with_left(TreeNode::leaf("B")),
    );

    let summary = service().summarize(&tree);

    assert_eq!(summary.balance_mismatches.len(), 1);
    let mismatch = &summary.balance_mismatches[0];
    assert_eq!(mismatch.label, "A");
    assert_eq!(mismatch.declared_height, 5);
    assert_eq!(mismatch.actual_height, 2);
    assert_eq!(mismatch.declared_balance, 2);
    assert_eq!(mismatch.actual_balance, 1);
}

#[test]
fn given_empty_tree_when_summarizing_then_everything_is_zero() {
    let summary = service().summarize(&CategoryTree::empty());
    assert_eq!(summary.nodes, 0);
    assert_eq!(summary.depth, 0);
    assert!(summary.leaves.is_empty());
}
