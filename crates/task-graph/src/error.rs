//! Error types for task graph operations.

use crate::TaskId;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for task graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during task graph operations.
///
/// Every mutating operation either succeeds completely or returns one of
/// these and leaves the graph untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum Error {
    /// Rejected input: empty name, zero duration, self-loop edge, malformed snapshot entry.
    #[error("Invalid input: {message}")]
    #[diagnostic(code(taskdag_graph::invalid_input))]
    InvalidInput {
        /// Description of what was rejected.
        message: String,
    },

    /// The dependency already exists.
    #[error("Dependency '{from}' -> '{to}' already exists")]
    #[diagnostic(code(taskdag_graph::duplicate_edge))]
    DuplicateEdge {
        /// Source task of the edge.
        from: TaskId,
        /// Target task of the edge.
        to: TaskId,
    },

    /// Adding the dependency would close a cycle.
    #[error("Dependency '{from}' -> '{to}' would create a cycle")]
    #[diagnostic(
        code(taskdag_graph::cycle_detected),
        help("'{to}' already reaches '{from}' through existing dependencies")
    )]
    CycleDetected {
        /// Source task of the rejected edge.
        from: TaskId,
        /// Target task of the rejected edge.
        to: TaskId,
    },

    /// A mutation referenced a task that is not in the graph.
    #[error("Task '{id}' not found")]
    #[diagnostic(code(taskdag_graph::not_found))]
    NotFound {
        /// The missing task id.
        id: TaskId,
    },

    /// An analysis found the graph in a state that should be impossible.
    #[error("Internal consistency error: {message}")]
    #[diagnostic(code(taskdag_graph::internal_consistency))]
    InternalConsistency {
        /// Description of the violated invariant.
        message: String,
    },
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a not found error for the given id.
    pub fn not_found(id: &TaskId) -> Self {
        Self::NotFound { id: id.clone() }
    }

    /// Create an internal consistency error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalConsistency {
            message: message.into(),
        }
    }
}
