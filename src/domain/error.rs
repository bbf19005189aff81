//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of the tree and layout rules.
/// These are independent of rendering and I/O concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("non-finite coordinate for {context}: ({x}, {y})")]
    NonFiniteCoordinate { context: String, x: f64, y: f64 },

    #[error("invalid layout metric {name}: {value}")]
    InvalidMetric { name: &'static str, value: f64 },

    #[error("visible node not rendered: {0}")]
    UnknownVisibleNode(String),

    #[error("tree node missing from arena: {0}")]
    DanglingNode(String),
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
