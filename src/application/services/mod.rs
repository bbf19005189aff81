//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, RenderSurface)
//! but are themselves concrete structs, not traits.

mod catalog;
mod layout;

pub use catalog::{CatalogService, TreeSummary};
pub use layout::{
    ConnectorRecord, RenderOutcome, SnapshotConnector, SnapshotNode, ToggleOutcome,
    TreeLayoutEngine, ViewSnapshot, VisualNodeRecord,
};
