//! cattree: category tree visualizer
//!
//! Lays out a pre-built binary category tree with click-to-expand subtrees
//! and draws it through an injected rendering surface.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub use application::services::{CatalogService, TreeLayoutEngine};
pub use domain::{CategoryTree, TreeNode, VisibleId};
pub use infrastructure::traits::RenderSurface;
