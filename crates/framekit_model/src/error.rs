// SPDX-License-Identifier: MIT OR Apache-2.0
//! Load diagnostics and query errors.

use framekit_graph::{GraphError, ResolveError};
use serde::{Deserialize, Serialize};

/// Category of a load diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// The element is not of the kind the loader expects
    ElementIncorrectType,
    /// A required attribute is missing
    AttributeMissing,
    /// An attribute has a value outside its allowed set
    AttributeInvalid,
    /// A required child element is missing
    ElementMissing,
    /// A collaborator the loader needs was not supplied
    FunctionArgumentMissing,
    /// A frame lookup or edge insertion in the frame graph failed
    FrameGraphError,
    /// The name is reserved (`__name__`)
    ReservedName,
    /// Another entity of the same kind already uses the name
    DuplicateName,
}

impl ErrorCode {
    /// Whether the condition stops the current element's load
    pub fn is_fatal(self) -> bool {
        matches!(self, Self::ElementIncorrectType)
    }
}

/// One problem found while loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("[{code:?}] {message}")]
pub struct Diagnostic {
    /// Category
    pub code: ErrorCode,
    /// Human readable description
    pub message: String,
}

impl Diagnostic {
    /// Create a diagnostic
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Ordered diagnostics returned by a load
pub type Diagnostics = Vec<Diagnostic>;

/// Error answering an entity pose query
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoseError {
    /// The entity was loaded without a frame graph
    #[error("'{0}' was loaded without a frame graph and cannot resolve poses")]
    NoFrameGraph(String),

    /// Resolution failed
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl From<GraphError> for PoseError {
    fn from(err: GraphError) -> Self {
        Self::Resolve(ResolveError::Graph(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_structural_mismatch_is_fatal() {
        assert!(ErrorCode::ElementIncorrectType.is_fatal());
        assert!(!ErrorCode::AttributeMissing.is_fatal());
        assert!(!ErrorCode::FrameGraphError.is_fatal());
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(ErrorCode::ElementMissing, "The child element is missing.");
        assert_eq!(
            diagnostic.to_string(),
            "[ElementMissing] The child element is missing."
        );
    }
}
