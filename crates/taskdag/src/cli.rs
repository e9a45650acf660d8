use crate::tracing::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Maintain a DAG of tasks and analyse its schedule.
#[derive(Parser, Debug)]
#[command(name = "taskdag")]
#[command(
    about = "Maintain a dependency graph of tasks and compute levels, critical path and adjacency matrix"
)]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level.
    #[arg(
        short = 'l',
        long,
        global = true,
        help = "Set logging level",
        default_value = "warn",
        value_enum
    )]
    pub level: LogLevel,

    /// Tracing filter directives, overriding `RUST_LOG` and `--level`.
    #[arg(
        long,
        global = true,
        value_name = "DIRECTIVES",
        help = "Tracing filter directives, e.g. 'taskdag_graph=trace' (overrides RUST_LOG and --level)"
    )]
    pub log_filter: Option<String>,

    /// Emit JSON output and JSON log lines.
    #[arg(long, global = true, help = "Emit JSON output and JSON log lines")]
    pub json: bool,

    /// Store file holding the graph.
    #[arg(
        long,
        global = true,
        env = "TASKDAG_STORE",
        value_name = "PATH",
        help = "Path to the graph store file"
    )]
    pub store: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Task operations.
    #[command(about = "Add, remove, edit and list tasks")]
    Task {
        /// Task subcommand.
        #[command(subcommand)]
        subcommand: TaskCommands,
    },
    /// Dependency operations.
    #[command(about = "Add, remove and list dependencies")]
    Dep {
        /// Dependency subcommand.
        #[command(subcommand)]
        subcommand: DepCommands,
    },
    /// Show the topological levels.
    #[command(about = "Show tasks grouped into topological levels")]
    Levels,
    /// Show the critical path.
    #[command(about = "Show per-task timing and the critical path")]
    Critical,
    /// Show the adjacency matrix.
    #[command(about = "Show the adjacency matrix")]
    Matrix,
    /// Run every analysis.
    #[command(about = "Show levels, critical path and adjacency matrix together")]
    Analyze,
    /// Remove every task and dependency.
    #[command(about = "Remove every task and dependency")]
    Clear {
        /// Confirm the deletion.
        #[arg(long, help = "Confirm removing everything")]
        yes: bool,
    },
    /// Print the store as a JSON snapshot.
    #[command(about = "Print the graph as a JSON snapshot")]
    Export,
    /// Replace the store with a JSON snapshot.
    #[command(about = "Replace the graph with a JSON snapshot file")]
    Import {
        /// Snapshot file to read.
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Fail on the first invalid entry instead of dropping it.
        #[arg(long, help = "Fail on the first invalid entry instead of dropping it")]
        strict: bool,
    },
}

/// Task subcommands.
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Add a task.
    #[command(about = "Add a task")]
    Add {
        /// Task name.
        name: String,
        /// Duration in whole time units.
        duration: u64,
    },
    /// Remove a task and its dependencies.
    #[command(about = "Remove a task and every dependency touching it", alias = "remove")]
    Rm {
        /// Task id, unique name or unique id prefix.
        task: String,
    },
    /// List tasks.
    #[command(about = "List tasks", alias = "ls")]
    List,
    /// Rename a task.
    #[command(about = "Rename a task")]
    Rename {
        /// Task id, unique name or unique id prefix.
        task: String,
        /// New name.
        name: String,
    },
    /// Change a task's duration.
    #[command(about = "Change the duration of a task")]
    Duration {
        /// Task id, unique name or unique id prefix.
        task: String,
        /// New duration.
        duration: u64,
    },
}

/// Dependency subcommands.
#[derive(Subcommand, Debug)]
pub enum DepCommands {
    /// Add a dependency.
    #[command(about = "Add a dependency: FROM must finish before TO starts")]
    Add {
        /// Task that finishes first.
        from: String,
        /// Task that waits.
        to: String,
    },
    /// Remove a dependency.
    #[command(about = "Remove a dependency", alias = "remove")]
    Rm {
        /// Task that finishes first.
        from: String,
        /// Task that waits.
        to: String,
    },
    /// List dependencies.
    #[command(about = "List dependencies", alias = "ls")]
    List,
}

/// Parse the process arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
