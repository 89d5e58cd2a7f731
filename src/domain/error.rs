//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::Axis;

/// Domain errors represent violations of the quadtree construction rules.
/// All of them are raised before a tree is handed out; there are no partial trees.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("degenerate geometry: all points share the same {axis} coordinate")]
    DegenerateGeometry { axis: Axis },

    #[error("recursion limit exceeded: {points} points still unseparated at depth {depth}")]
    RecursionLimitExceeded { depth: usize, points: usize },
}

impl DomainError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;
