//! CLI error types with miette diagnostics and exit code mapping

use miette::{Diagnostic, Report};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Successful run
pub const EXIT_OK: i32 = 0;
/// Invalid input or rejected graph mutation exit code
pub const EXIT_CLI: i32 = 2;
/// Store I/O or unexpected error exit code
pub const EXIT_STORE: i32 = 3;

/// Errors surfaced by the `taskdag` binary, each mapped to an exit code
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Invalid input, unresolved task reference or rejected mutation (exit code 2)
    #[error("{message}")]
    #[diagnostic(code(taskdag::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },

    /// The store file could not be read, parsed or written (exit code 3)
    #[error("Store error for {}: {message}", .path.display())]
    #[diagnostic(
        code(taskdag::cli::store),
        help("Check file permissions, or point --store / TASKDAG_STORE at another file")
    )]
    Store {
        /// The error message
        message: String,
        /// Path of the store file
        path: PathBuf,
    },

    /// Anything else, including broken engine invariants (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(taskdag::cli::other))]
    Other {
        /// The error message
        message: String,
    },
}

impl CliError {
    /// Input error without help text
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Input error with a hint for the user
    #[must_use]
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Store failure for `path`
    #[must_use]
    pub fn store(path: &Path, message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
            path: path.to_path_buf(),
        }
    }

    /// Unexpected failure
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Short machine-readable code for JSON output
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Store { .. } => "store",
            Self::Other { .. } => "other",
        }
    }
}

/// Convert engine errors to CLI errors.
///
/// Rejected mutations are user input problems (exit code 2); a broken
/// invariant is unexpected (exit code 3).
impl From<taskdag_graph::Error> for CliError {
    fn from(err: taskdag_graph::Error) -> Self {
        use taskdag_graph::Error;

        match err {
            Error::InvalidInput { .. } => Self::config(err.to_string()),
            Error::DuplicateEdge { .. } => Self::config_with_help(
                err.to_string(),
                "Run 'taskdag dep list' to see existing dependencies",
            ),
            Error::CycleDetected { .. } => Self::config_with_help(
                err.to_string(),
                "The target task already depends on the source, directly or transitively",
            ),
            Error::NotFound { .. } => {
                Self::config_with_help(err.to_string(), "Run 'taskdag task list' to see task ids")
            }
            Error::InternalConsistency { .. } => Self::other(err.to_string()),
        }
    }
}

/// Process exit code for an error
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Store { .. } | CliError::Other { .. } => EXIT_STORE,
    }
}

/// `{"status": "ok", "data": ...}` wrapper for `--json` output
#[derive(Debug, Clone, Serialize)]
pub struct OkEnvelope<T> {
    /// Always `"ok"`
    pub status: &'static str,
    /// Command result
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Wrap a command result
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// `{"status": "error", "error": ...}` wrapper for `--json` output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope<E> {
    /// Always `"error"`
    pub status: &'static str,
    /// The error details
    pub error: E,
}

impl<E> ErrorEnvelope<E> {
    /// Wrap error details
    #[must_use]
    pub const fn new(error: E) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Print an error: a JSON envelope on stdout with `--json`, otherwise a
/// miette report on stderr
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: CliError, json_mode: bool) {
    if json_mode {
        let envelope = ErrorEnvelope::new(serde_json::json!({
            "code": err.code(),
            "message": err.to_string(),
        }));
        match serde_json::to_string(&envelope) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to serialize error: {e}"),
        }
    } else {
        let report = Report::new(err);
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdag_graph::TaskId;

    #[test]
    fn test_engine_errors_map_to_exit_codes() {
        let cycle: CliError = taskdag_graph::Error::CycleDetected {
            from: TaskId::from("a"),
            to: TaskId::from("b"),
        }
        .into();
        assert_eq!(exit_code_for(&cycle), EXIT_CLI);
        assert!(cycle.to_string().contains("would create a cycle"));

        let internal: CliError = taskdag_graph::Error::internal("broken").into();
        assert_eq!(exit_code_for(&internal), EXIT_STORE);
    }

    #[test]
    fn test_store_error_mentions_path() {
        let err = CliError::store(Path::new("/tmp/graph.json"), "expected value");
        assert_eq!(err.code(), "store");
        assert!(err.to_string().contains("/tmp/graph.json"));
        assert_eq!(exit_code_for(&err), EXIT_STORE);
    }

    #[test]
    fn test_config_help() {
        let err = CliError::config_with_help("bad", "try again");
        match err {
            CliError::Config { help, .. } => assert_eq!(help.as_deref(), Some("try again")),
            other => panic!("expected config error, got {other:?}"),
        }
    }
}
