//! Read-only analysis commands: levels, critical path, matrix and the
//! combined report.

use super::{CommandContext, display_name, table};
use crate::errors::CliError;
use serde::Serialize;
use taskdag_graph::{AnalysisReport, TaskGraph, TaskId, TimingRow};
use tracing::debug;

const EMPTY: &str = "No tasks defined. Add some with 'taskdag task add NAME DURATION'";

#[derive(Debug, Serialize)]
struct LevelEntry {
    level: usize,
    tasks: Vec<TaskRef>,
}

#[derive(Debug, Serialize)]
struct TaskRef {
    id: TaskId,
    name: String,
}

#[derive(Debug, Serialize)]
struct CriticalOutput<'a> {
    project_duration: u64,
    critical_path: &'a [String],
    timings: &'a [TimingRow],
}

/// Show tasks grouped into levels.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or levelling fails.
pub fn levels(ctx: &CommandContext) -> Result<String, CliError> {
    let graph = ctx.store.load()?;
    let levels = graph.compute_levels()?;
    debug!(levels = levels.len(), "Computed levels");

    let entries: Vec<LevelEntry> = levels
        .iter()
        .enumerate()
        .map(|(level, ids)| LevelEntry {
            level,
            tasks: ids
                .iter()
                .map(|id| TaskRef {
                    id: id.clone(),
                    name: display_name(&graph, id),
                })
                .collect(),
        })
        .collect();

    ctx.render(&entries, || {
        if entries.is_empty() {
            return EMPTY.to_string();
        }
        entries
            .iter()
            .map(|entry| {
                let names: Vec<&str> = entry.tasks.iter().map(|t| t.name.as_str()).collect();
                format!("Level {}: {}", entry.level, names.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    })
}

/// Show the CPM timing table and the critical path.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or the analysis fails.
pub fn critical(ctx: &CommandContext) -> Result<String, CliError> {
    let graph = ctx.store.load()?;
    let report = graph.analysis_report()?;

    ctx.render(
        &CriticalOutput {
            project_duration: report.project_duration,
            critical_path: &report.critical_path,
            timings: &report.timings,
        },
        || {
            if report.timings.is_empty() {
                return EMPTY.to_string();
            }
            render_critical(&report)
        },
    )
}

/// Show the adjacency matrix.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded.
pub fn matrix(ctx: &CommandContext) -> Result<String, CliError> {
    let graph = ctx.store.load()?;
    let matrix = graph.adjacency_matrix();

    ctx.render(&matrix, || {
        if matrix.is_empty() {
            return EMPTY.to_string();
        }
        matrix.to_string().trim_end().to_string()
    })
}

/// Show every analysis together.
///
/// # Errors
///
/// Returns an error if the store cannot be loaded or the analysis fails.
pub fn analyze(ctx: &CommandContext) -> Result<String, CliError> {
    let graph = ctx.store.load()?;
    let report = graph.analysis_report()?;

    ctx.render(&report, || {
        if report.timings.is_empty() {
            return EMPTY.to_string();
        }
        render_report(&graph, &report)
    })
}

fn render_critical(report: &AnalysisReport) -> String {
    let rows: Vec<Vec<String>> = report
        .timings
        .iter()
        .map(|row| {
            vec![
                row.name.clone(),
                row.duration.to_string(),
                row.timing.early_start.to_string(),
                row.timing.early_finish.to_string(),
                row.timing.late_start.to_string(),
                row.timing.late_finish.to_string(),
                row.timing.slack.to_string(),
                if row.critical { "*" } else { "" }.to_string(),
            ]
        })
        .collect();

    format!(
        "{}\n\nProject duration: {}\nCritical path: {}",
        table(
            &["TASK", "DURATION", "ES", "EF", "LS", "LF", "SLACK", "CRITICAL"],
            &rows
        ),
        report.project_duration,
        report.critical_summary()
    )
}

fn render_report(graph: &TaskGraph, report: &AnalysisReport) -> String {
    let levels = report
        .levels
        .iter()
        .enumerate()
        .map(|(i, names)| format!("  Level {i}: {}", names.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Tasks: {}  Dependencies: {}\n\n\
         Topological order: {}\n\n\
         Levels (max parallelism {}):\n{levels}\n\n\
         {}\n\n\
         Adjacency matrix:\n{}",
        graph.task_count(),
        graph.dependency_count(),
        report.topological_summary(),
        report.max_parallelism,
        render_critical(report),
        report.matrix.to_string().trim_end()
    )
}
