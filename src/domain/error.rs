//! Domain-level errors (no external dependencies)

use generational_arena::Index;
use thiserror::Error;

use crate::domain::arena::NodeType;

/// Domain errors represent violations inside the document tree, the rule
/// engine and the serializer. They are independent of I/O concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("node not found in tree: {0:?}")]
    NodeNotFound(Index),

    #[error("expected root node, got {0} node")]
    NotRoot(NodeType),

    #[error("failed to evaluate expression '{expression}': {reason}")]
    Condition { expression: String, reason: String },

    #[error("[name:{0}] is not a valid structural macro")]
    UnknownStructuralMacro(String),
}

impl DomainError {
    pub(crate) fn condition(expression: &str, reason: impl Into<String>) -> Self {
        Self::Condition {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
