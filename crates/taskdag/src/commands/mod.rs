//! Command implementations.
//!
//! Every command loads the store, calls into the engine and returns the text
//! to print. Mutating commands save only after the engine accepted the change.

pub mod analyze;
pub mod dep;
pub mod snapshot;
pub mod task;

use crate::cli::Commands;
use crate::errors::{CliError, OkEnvelope};
use crate::store::Store;
use serde::Serialize;
use taskdag_graph::{TaskGraph, TaskId};

/// Shared state for command execution.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Where the graph is persisted.
    pub store: Store,
    /// Render results as JSON envelopes.
    pub json: bool,
}

impl CommandContext {
    /// Create a context for the given store.
    #[must_use]
    pub const fn new(store: Store, json: bool) -> Self {
        Self { store, json }
    }

    /// Render `data` as a JSON envelope, or `text()` in human mode.
    pub(crate) fn render<T: Serialize>(
        &self,
        data: &T,
        text: impl FnOnce() -> String,
    ) -> Result<String, CliError> {
        if self.json {
            serde_json::to_string_pretty(&OkEnvelope::new(data))
                .map_err(|e| CliError::other(format!("Failed to serialize output: {e}")))
        } else {
            Ok(text())
        }
    }
}

/// Execute a parsed command and return its output.
///
/// # Errors
///
/// Returns a [`CliError`] if the store cannot be read or written, a task
/// reference does not resolve, or the engine rejects the operation.
pub fn execute(command: Commands, ctx: &CommandContext) -> Result<String, CliError> {
    match command {
        Commands::Task { subcommand } => task::execute(subcommand, ctx),
        Commands::Dep { subcommand } => dep::execute(subcommand, ctx),
        Commands::Levels => analyze::levels(ctx),
        Commands::Critical => analyze::critical(ctx),
        Commands::Matrix => analyze::matrix(ctx),
        Commands::Analyze => analyze::analyze(ctx),
        Commands::Clear { yes } => snapshot::clear(ctx, yes),
        Commands::Export => snapshot::export(ctx),
        Commands::Import { file, strict } => snapshot::import(ctx, &file, strict),
    }
}

/// Resolve a task reference: exact id, then unique name, then unique id prefix.
///
/// # Errors
///
/// Returns a config error if the reference is blank, nothing matches, or the
/// reference is ambiguous.
pub fn resolve_task(graph: &TaskGraph, reference: &str) -> Result<TaskId, CliError> {
    if reference.trim().is_empty() {
        return Err(CliError::config_with_help(
            "Task reference is empty",
            "Pass a task id, a unique name or a unique id prefix",
        ));
    }

    let exact = TaskId::from(reference);
    if graph.contains_task(&exact) {
        return Ok(exact);
    }

    let by_name = graph.find_by_name(reference);
    match by_name.as_slice() {
        [task] => return Ok(task.id.clone()),
        [] => {}
        many => {
            let ids = many
                .iter()
                .map(|t| t.id.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(CliError::config_with_help(
                format!("Task name '{reference}' is ambiguous"),
                format!("Use one of the ids instead: {ids}"),
            ));
        }
    }

    let by_prefix: Vec<&TaskId> = graph
        .tasks()
        .map(|t| &t.id)
        .filter(|id| id.as_str().starts_with(reference))
        .collect();
    match by_prefix.as_slice() {
        [id] => Ok((*id).clone()),
        [] => Err(CliError::config_with_help(
            format!("No task matches '{reference}'"),
            "Run 'taskdag task list' to see task names and ids",
        )),
        _ => Err(CliError::config_with_help(
            format!("Task id prefix '{reference}' is ambiguous"),
            "Use more characters of the id",
        )),
    }
}

/// Name of a task for display, falling back to its id.
pub(crate) fn display_name(graph: &TaskGraph, id: &TaskId) -> String {
    graph
        .task(id)
        .map_or_else(|| id.to_string(), |task| task.name.clone())
}

/// Render rows as left-aligned columns separated by two spaces.
pub(crate) fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![render_row(headers.iter().copied(), &widths)];
    for row in rows {
        lines.push(render_row(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn render_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
