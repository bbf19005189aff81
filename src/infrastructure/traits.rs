//! I/O boundary traits for testability
//!
//! These traits abstract the file system and the rendering surface, allowing
//! services to be tested with in-memory implementations.

use std::fmt;
use std::io;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::domain::UiEvent;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Opaque handle to an element created by a [`RenderSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ElementHandle(pub u64);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Node,
    Connector,
    EmptyState,
}

/// Drawing surface the layout engine renders into.
///
/// Only primitive operations; the engine decides what to draw and where.
pub trait RenderSurface {
    /// Create a detached element.
    fn create_element(&mut self, kind: ElementKind) -> ElementHandle;

    fn set_attribute(&mut self, element: ElementHandle, name: &str, value: &str);

    fn set_style(&mut self, element: ElementHandle, property: &str, value: &str);

    /// Replace the text content of an element. Lines are separated by `\n`.
    fn set_text(&mut self, element: ElementHandle, text: &str);

    fn add_class(&mut self, element: ElementHandle, class: &str);

    fn remove_class(&mut self, element: ElementHandle, class: &str);

    /// Register a click listener; `event` is handed back on dispatch.
    fn listen(&mut self, element: ElementHandle, event: UiEvent);

    /// Add `class` to `element` once `delay` has elapsed.
    /// Fire-and-forget: dropped silently if the element is removed first.
    fn defer_class(&mut self, element: ElementHandle, class: &str, delay: Duration);

    /// Attach an element to the drawing area.
    fn append(&mut self, element: ElementHandle);

    /// Detach and forget an element, including its listener.
    fn remove(&mut self, element: ElementHandle);

    /// Remove every element.
    fn clear(&mut self);

    /// Replace the content with the "nothing to show" placeholder.
    fn show_empty_state(&mut self);
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
