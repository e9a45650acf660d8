//! `taskdag task ...`

use super::{CommandContext, resolve_task, table};
use crate::cli::TaskCommands;
use crate::errors::CliError;
use serde_json::json;
use taskdag_graph::Task;
use tracing::info;

/// Execute a task subcommand.
///
/// # Errors
///
/// Returns an error if the store fails, the task reference does not
/// resolve, or the engine rejects the input.
pub fn execute(command: TaskCommands, ctx: &CommandContext) -> Result<String, CliError> {
    match command {
        TaskCommands::Add { name, duration } => add(ctx, &name, duration),
        TaskCommands::Rm { task } => remove(ctx, &task),
        TaskCommands::List => list(ctx),
        TaskCommands::Rename { task, name } => rename(ctx, &task, &name),
        TaskCommands::Duration { task, duration } => set_duration(ctx, &task, duration),
    }
}

fn add(ctx: &CommandContext, name: &str, duration: u64) -> Result<String, CliError> {
    let mut graph = ctx.store.load()?;
    let id = graph.add_task(name, duration)?;
    ctx.store.save(&graph)?;

    let task = graph
        .task(&id)
        .cloned()
        .ok_or_else(|| CliError::other(format!("Task '{id}' vanished after insert")))?;
    info!(id = %task.id, name = %task.name, duration, "Added task");

    ctx.render(&task, || {
        format!("Added task '{}' ({}) with duration {}", task.name, task.id, task.duration)
    })
}

fn remove(ctx: &CommandContext, reference: &str) -> Result<String, CliError> {
    let mut graph = ctx.store.load()?;
    let id = resolve_task(&graph, reference)?;
    let edges_before = graph.dependency_count();
    let task = graph.remove_task(&id)?;
    let edges_removed = edges_before - graph.dependency_count();
    ctx.store.save(&graph)?;

    info!(id = %task.id, edges_removed, "Removed task");

    ctx.render(
        &json!({ "task": task, "dependencies_removed": edges_removed }),
        || {
            format!(
                "Removed task '{}' and {} dependenc{}",
                task.name,
                edges_removed,
                if edges_removed == 1 { "y" } else { "ies" }
            )
        },
    )
}

fn list(ctx: &CommandContext) -> Result<String, CliError> {
    let graph = ctx.store.load()?;
    let tasks: Vec<&Task> = graph.tasks().collect();

    ctx.render(&tasks, || {
        if tasks.is_empty() {
            return "No tasks defined".to_string();
        }
        let rows: Vec<Vec<String>> = tasks
            .iter()
            .map(|task| {
                vec![
                    task.id.to_string(),
                    task.name.clone(),
                    task.duration.to_string(),
                ]
            })
            .collect();
        table(&["ID", "NAME", "DURATION"], &rows)
    })
}

fn rename(ctx: &CommandContext, reference: &str, name: &str) -> Result<String, CliError> {
    let mut graph = ctx.store.load()?;
    let id = resolve_task(&graph, reference)?;
    let old = graph
        .task(&id)
        .map(|task| task.name.clone())
        .unwrap_or_default();
    graph.rename_task(&id, name)?;
    ctx.store.save(&graph)?;

    let task = graph.task(&id).cloned();
    info!(id = %id, old = %old, "Renamed task");

    ctx.render(&task, || match &task {
        Some(task) => format!("Renamed '{old}' to '{}'", task.name),
        None => format!("Renamed '{old}'"),
    })
}

fn set_duration(ctx: &CommandContext, reference: &str, duration: u64) -> Result<String, CliError> {
    let mut graph = ctx.store.load()?;
    let id = resolve_task(&graph, reference)?;
    graph.set_duration(&id, duration)?;
    ctx.store.save(&graph)?;

    let task = graph.task(&id).cloned();
    info!(id = %id, duration, "Changed task duration");

    ctx.render(&task, || match &task {
        Some(task) => format!("Set duration of '{}' to {}", task.name, task.duration),
        None => format!("Set duration of '{id}' to {duration}"),
    })
}
