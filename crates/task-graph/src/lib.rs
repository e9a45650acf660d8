//! Task graph DAG algorithms and scheduling analysis for taskdag.
//!
//! This crate keeps a directed acyclic graph of tasks with integer durations
//! and computes scheduling analytics over it. Acyclicity is enforced when an
//! edge is inserted, so every analysis can assume a valid DAG.
//!
//! # Key Types
//!
//! - [`TaskGraph`]: the graph store with cycle-safe mutation
//! - [`Levels`]: Kahn's-algorithm level decomposition
//! - [`CriticalPath`]: CPM timings, project duration and the zero-slack set
//! - [`AdjacencyMatrix`] and [`AnalysisReport`]: derived views for display
//! - [`GraphSnapshot`]: the plain structure used for persistence
//!
//! # Example
//!
//! ```
//! use taskdag_graph::TaskGraph;
//!
//! let mut graph = TaskGraph::new();
//! let a = graph.add_task("A", 3)?;
//! let b = graph.add_task("B", 2)?;
//! let c = graph.add_task("C", 4)?;
//! graph.add_dependency(&a, &c)?;
//! graph.add_dependency(&b, &c)?;
//!
//! let levels = graph.compute_levels()?;
//! let cpm = graph.critical_path(&levels)?;
//! assert_eq!(cpm.project_duration(), 7);
//! assert_eq!(cpm.critical_tasks(), &[a, c]);
//! # Ok::<(), taskdag_graph::Error>(())
//! ```

mod critical_path;
mod error;
mod graph;
mod report;
mod snapshot;
mod task;
mod traversal;

pub use critical_path::{CriticalPath, TaskTiming};
pub use error::{Error, Result};
pub use graph::TaskGraph;
pub use report::{AdjacencyMatrix, AnalysisReport, TimingRow};
pub use snapshot::GraphSnapshot;
pub use task::{Dependency, Task, TaskId};
pub use traversal::Levels;
