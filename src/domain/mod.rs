//! Domain layer: entities and layout rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod visible_id;

pub use arena::{BalanceMismatch, CategoryArena, CategoryNode, NodeData, Side};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use geometry::{connector_between, Connector, LayoutMetrics, Point, RevealTiming};
pub use interaction::{ToggleRequest, UiEvent};
pub use visible_id::{Placement, VisibleId};
