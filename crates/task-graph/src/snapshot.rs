//! Plain structural representation of a task graph.
//!
//! [`GraphSnapshot`] is the shape persisted by front ends:
//!
//! ```json
//! {
//!   "tasks": [{ "id": "1", "name": "build", "duration": 3 }],
//!   "dependencies": [{ "from": "1", "to": "2" }]
//! }
//! ```

use crate::{Dependency, Error, Result, Task, TaskGraph};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Serializable state of a [`TaskGraph`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Tasks in insertion order.
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Dependencies in insertion order.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl TaskGraph {
    /// Capture the current tasks and dependencies.
    #[must_use]
    pub fn to_snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            tasks: self.tasks().cloned().collect(),
            dependencies: self.dependencies().cloned().collect(),
        }
    }

    /// Rebuild a graph from a snapshot, dropping entries that do not fit.
    ///
    /// Tasks are inserted first, then dependencies, each through the same
    /// validation as the mutation API. Every rejected entry is logged and
    /// returned alongside the graph; unknown task ids in a dependency are
    /// reported as [`Error::InvalidInput`].
    #[must_use]
    pub fn from_snapshot(snapshot: GraphSnapshot) -> (Self, Vec<Error>) {
        let mut graph = Self::new();
        let mut rejected = Vec::new();

        for task in snapshot.tasks {
            let id = task.id.clone();
            if let Err(err) = graph.insert_task(task) {
                warn!(task = %id, error = %err, "Dropped task from snapshot");
                rejected.push(err);
            }
        }

        for dep in snapshot.dependencies {
            if let Err(err) = graph.load_dependency(&dep) {
                warn!(dependency = %dep, error = %err, "Dropped dependency from snapshot");
                rejected.push(err);
            }
        }

        debug!(
            tasks = graph.task_count(),
            dependencies = graph.dependency_count(),
            rejected = rejected.len(),
            "Loaded task graph snapshot"
        );
        (graph, rejected)
    }

    /// Rebuild a graph from a snapshot, failing on the first invalid entry.
    ///
    /// # Errors
    ///
    /// Returns the error of the first task or dependency that could not be inserted.
    pub fn try_from_snapshot(snapshot: GraphSnapshot) -> Result<Self> {
        let mut graph = Self::new();
        for task in snapshot.tasks {
            graph.insert_task(task)?;
        }
        for dep in &snapshot.dependencies {
            graph.load_dependency(dep)?;
        }
        Ok(graph)
    }

    fn load_dependency(&mut self, dep: &Dependency) -> Result<()> {
        match self.add_dependency(&dep.from, &dep.to) {
            Err(Error::NotFound { id }) => Err(Error::invalid_input(format!(
                "dependency {dep} references unknown task '{id}'"
            ))),
            other => other,
        }
    }
}
