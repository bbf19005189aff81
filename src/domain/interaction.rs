//! User interaction payloads.
//!
//! A rendering surface stores the payload registered with a listener and hands
//! it back when the element is clicked; the engine never looks anything up by
//! global name.

use generational_arena::Index;

use crate::domain::geometry::Point;
use crate::domain::visible_id::VisibleId;

/// Everything needed to toggle one rendered node.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleRequest {
    pub id: VisibleId,
    pub node: Index,
    pub depth: usize,
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Toggle(ToggleRequest),
}
