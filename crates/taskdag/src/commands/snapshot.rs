//! Whole-graph commands: clear, export and import.

use super::CommandContext;
use crate::errors::CliError;
use serde_json::json;
use std::fs;
use std::path::Path;
use taskdag_graph::{GraphSnapshot, TaskGraph};
use tracing::{info, warn};

/// Remove every task and dependency.
///
/// # Errors
///
/// Returns a config error without `--yes`, or a store error if saving fails.
pub fn clear(ctx: &CommandContext, yes: bool) -> Result<String, CliError> {
    if !yes {
        return Err(CliError::config_with_help(
            "Refusing to clear the graph without confirmation",
            "Re-run with --yes to remove every task and dependency",
        ));
    }

    let mut graph = ctx.store.load()?;
    let tasks = graph.task_count();
    let dependencies = graph.dependency_count();
    graph.clear();
    ctx.store.save(&graph)?;

    info!(tasks, dependencies, "Cleared graph");

    ctx.render(
        &json!({ "tasks_removed": tasks, "dependencies_removed": dependencies }),
        || format!("Removed {tasks} tasks and {dependencies} dependencies"),
    )
}

/// Print the graph as a snapshot document.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or serialization fails.
pub fn export(ctx: &CommandContext) -> Result<String, CliError> {
    let graph = ctx.store.load()?;
    let snapshot = graph.to_snapshot();

    if ctx.json {
        return ctx.render(&snapshot, String::new);
    }
    serde_json::to_string_pretty(&snapshot)
        .map_err(|e| CliError::other(format!("Failed to serialize snapshot: {e}")))
}

/// Replace the graph with the snapshot in `file`.
///
/// Without `strict`, entries the engine rejects are dropped and reported.
///
/// # Errors
///
/// Returns a config error if the file cannot be read or parsed, or if
/// `strict` is set and any entry is rejected.
pub fn import(ctx: &CommandContext, file: &Path, strict: bool) -> Result<String, CliError> {
    let content = fs::read_to_string(file).map_err(|e| {
        CliError::config(format!("Cannot read snapshot {}: {e}", file.display()))
    })?;
    let snapshot: GraphSnapshot = serde_json::from_str(&content).map_err(|e| {
        CliError::config_with_help(
            format!("Invalid snapshot {}: {e}", file.display()),
            "Expected {\"tasks\": [{\"id\", \"name\", \"duration\"}], \"dependencies\": [{\"from\", \"to\"}]}",
        )
    })?;

    let (graph, rejected) = if strict {
        (TaskGraph::try_from_snapshot(snapshot)?, Vec::new())
    } else {
        TaskGraph::from_snapshot(snapshot)
    };
    for err in &rejected {
        warn!(file = %file.display(), error = %err, "Dropped snapshot entry");
    }
    ctx.store.save(&graph)?;

    info!(
        tasks = graph.task_count(),
        dependencies = graph.dependency_count(),
        dropped = rejected.len(),
        "Imported snapshot"
    );

    let messages: Vec<String> = rejected.iter().map(ToString::to_string).collect();
    ctx.render(
        &json!({
            "tasks": graph.task_count(),
            "dependencies": graph.dependency_count(),
            "dropped": messages,
        }),
        || {
            let mut out = format!(
                "Imported {} tasks and {} dependencies",
                graph.task_count(),
                graph.dependency_count()
            );
            if !messages.is_empty() {
                out.push_str(&format!("\nDropped {} entries:", messages.len()));
                for message in &messages {
                    out.push_str("\n  ");
                    out.push_str(message);
                }
            }
            out
        },
    )
}
