//! taskdag - command-line front end for the task graph engine
//!
//! The graph lives in a JSON store file. Each invocation loads it, applies
//! one command through [`taskdag_graph::TaskGraph`], and writes it back when
//! the command changed it.
//!
//! Output goes to stdout, either as text or, with `--json`, as an
//! `{"status": "ok", "data": ...}` envelope. Logs and human-readable errors
//! go to stderr.

/// CLI argument parsing.
pub mod cli;
/// Command implementations.
pub mod commands;
/// Error types and exit codes.
pub mod errors;
/// JSON file persistence.
pub mod store;
/// Tracing setup.
pub mod tracing;

use cli::Cli;
use commands::CommandContext;
use errors::CliError;
use std::path::PathBuf;
use store::Store;

/// Resolve the store path: explicit flag or `TASKDAG_STORE`, else the default.
#[must_use]
pub fn store_path(cli: &Cli) -> PathBuf {
    cli.store.clone().unwrap_or_else(Store::default_path)
}

/// Run a parsed command line and return the text to print.
///
/// # Errors
///
/// Returns the [`CliError`] of the failed command.
pub fn run(cli: Cli) -> Result<String, CliError> {
    let path = store_path(&cli);
    ::tracing::debug!(store = %path.display(), "Using store");
    let ctx = CommandContext::new(Store::new(path), cli.json);
    commands::execute(cli.command, &ctx)
}
