//! `taskdag dep ...`

use super::{CommandContext, display_name, resolve_task};
use crate::cli::DepCommands;
use crate::errors::CliError;
use serde_json::json;
use taskdag_graph::Dependency;
use tracing::info;

/// Execute a dependency subcommand.
///
/// # Errors
///
/// Returns an error if the store fails, a task reference does not resolve,
/// or the engine rejects the dependency.
pub fn execute(command: DepCommands, ctx: &CommandContext) -> Result<String, CliError> {
    match command {
        DepCommands::Add { from, to } => add(ctx, &from, &to),
        DepCommands::Rm { from, to } => remove(ctx, &from, &to),
        DepCommands::List => list(ctx),
    }
}

fn add(ctx: &CommandContext, from: &str, to: &str) -> Result<String, CliError> {
    let mut graph = ctx.store.load()?;
    let from = resolve_task(&graph, from)?;
    let to = resolve_task(&graph, to)?;
    graph.add_dependency(&from, &to)?;
    ctx.store.save(&graph)?;

    info!(from = %from, to = %to, "Added dependency");

    let dep = Dependency::new(from, to);
    ctx.render(&dep, || {
        format!(
            "Added dependency {} → {}",
            display_name(&graph, &dep.from),
            display_name(&graph, &dep.to)
        )
    })
}

fn remove(ctx: &CommandContext, from: &str, to: &str) -> Result<String, CliError> {
    let mut graph = ctx.store.load()?;
    let from = resolve_task(&graph, from)?;
    let to = resolve_task(&graph, to)?;
    let removed = graph.remove_dependency(&from, &to);
    if removed {
        ctx.store.save(&graph)?;
        info!(from = %from, to = %to, "Removed dependency");
    }

    let label = format!(
        "{} → {}",
        display_name(&graph, &from),
        display_name(&graph, &to)
    );
    ctx.render(
        &json!({ "from": from, "to": to, "removed": removed }),
        || {
            if removed {
                format!("Removed dependency {label}")
            } else {
                format!("No dependency {label}")
            }
        },
    )
}

fn list(ctx: &CommandContext) -> Result<String, CliError> {
    let graph = ctx.store.load()?;
    let deps: Vec<&Dependency> = graph.dependencies().collect();

    ctx.render(&deps, || {
        if deps.is_empty() {
            return "No dependencies defined".to_string();
        }
        deps.iter()
            .map(|dep| {
                format!(
                    "{} → {}",
                    display_name(&graph, &dep.from),
                    display_name(&graph, &dep.to)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}
