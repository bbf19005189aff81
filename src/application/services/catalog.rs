//! Catalog service
//!
//! Loads pre-built category trees and answers read-only questions about them.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{sample_tree, BalanceMismatch, CategoryArena, CategoryTree, Product};
use crate::infrastructure::traits::FileSystem;

/// Shape statistics of a category tree.
#[derive(Debug, Clone, Serialize)]
pub struct TreeSummary {
    pub nodes: usize,
    pub depth: usize,
    pub leaves: Vec<String>,
    /// Nodes whose declared height/balance factor disagree with the shape
    pub balance_mismatches: Vec<BalanceMismatch>,
}

/// Service for loading category trees and querying them.
pub struct CatalogService {
    fs: Arc<dyn FileSystem>,
}

impl CatalogService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load a tree from a JSON file, or the built-in sample when `path` is None.
    ///
    /// The file uses the backend's tree shape: `{"root": {"key": ..., "leftChild": ...}}`.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: Option<&Path>) -> ApplicationResult<CategoryTree> {
        let Some(path) = path else {
            debug!("load: no tree file, using sample catalog");
            return Ok(sample_tree());
        };
        if !self.fs.exists(path) {
            return Err(ApplicationError::TreeFileNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree file", path)?;
        let tree: CategoryTree =
            serde_json::from_str(&content).map_err(|e| ApplicationError::InvalidTreeFile {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        self.warn_on_duplicate_keys(&tree);
        Ok(tree)
    }

    /// Products of the category `key` and every category below it, depth-first
    /// (node, left subtree, right subtree). Unknown keys yield an empty list.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn recommend(&self, tree: &CategoryTree, key: &str) -> Vec<Product> {
        let arena = CategoryArena::from_tree(tree);
        match arena.find_by_key(key) {
            Some(idx) => arena.collect_products(idx).into_iter().cloned().collect(),
            None => {
                debug!("recommend: no category {}", key);
                Vec::new()
            }
        }
    }

    pub fn summarize(&self, tree: &CategoryTree) -> TreeSummary {
        let arena = CategoryArena::from_tree(tree);
        TreeSummary {
            nodes: arena.len(),
            depth: arena.depth(),
            leaves: arena.leaf_nodes(),
            balance_mismatches: arena.audit_balance(),
        }
    }

    fn warn_on_duplicate_keys(&self, tree: &CategoryTree) {
        let arena = CategoryArena::from_tree(tree);
        let mut seen = HashSet::new();
        for (_, node) in arena.iter() {
            if let Some(key) = &node.data.key {
                if !seen.insert(key.as_str()) {
                    warn!("duplicate category key in tree: {}", key);
                }
            }
        }
    }
}
