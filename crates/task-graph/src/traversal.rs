//! Level-based topological traversal of task graphs.
//!
//! [`TaskGraph::compute_levels`] runs Kahn's algorithm but releases tasks in
//! batches: every task whose in-degree drops to zero while the current level
//! is processed waits for the next level. Level *k* therefore holds the tasks
//! whose longest dependency chain from a source has length *k*, and the
//! widest level is the maximum parallelism of the graph.

use crate::{Error, Result, TaskGraph, TaskId};
use serde::Serialize;
use tracing::trace;

/// Groups of tasks that can execute in parallel.
///
/// The outer vector is ordered by dependency level: every task in level N
/// has all of its predecessors in levels `0..N`. Within a level, tasks are
/// ordered by the position at which they were released.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Levels(Vec<Vec<TaskId>>);

impl Levels {
    /// Number of levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no levels (empty graph).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the levels in order.
    pub fn iter(&self) -> impl Iterator<Item = &[TaskId]> {
        self.0.iter().map(Vec::as_slice)
    }

    /// Flat topological order: level 0 first, each level in release order.
    #[must_use]
    pub fn flatten(&self) -> Vec<&TaskId> {
        self.0.iter().flatten().collect()
    }

    /// Total number of tasks across all levels.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// The level a task was placed in.
    #[must_use]
    pub fn level_of(&self, id: &TaskId) -> Option<usize> {
        self.0.iter().position(|level| level.contains(id))
    }

    /// Size of the widest level.
    #[must_use]
    pub fn max_width(&self) -> usize {
        self.0.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Consume into the raw nested vectors.
    #[must_use]
    pub fn into_inner(self) -> Vec<Vec<TaskId>> {
        self.0
    }
}

impl From<Vec<Vec<TaskId>>> for Levels {
    fn from(levels: Vec<Vec<TaskId>>) -> Self {
        Self(levels)
    }
}

impl TaskGraph {
    /// Decompose the graph into dependency levels using Kahn's algorithm.
    ///
    /// Sources are taken in task insertion order, successors in dependency
    /// insertion order, so the result is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalConsistency`] if some tasks were never released,
    /// which only happens if the acyclic invariant was broken.
    pub fn compute_levels(&self) -> Result<Levels> {
        let ids: Vec<&TaskId> = self.tasks().map(|task| &task.id).collect();
        let (preds, succs) = self.adjacency()?;

        let mut in_degree: Vec<usize> = preds.iter().map(Vec::len).collect();
        let mut frontier: Vec<usize> = (0..ids.len()).filter(|&i| in_degree[i] == 0).collect();
        let mut levels: Vec<Vec<TaskId>> = Vec::new();
        let mut emitted = 0;

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for &current in &frontier {
                for &succ in &succs[current] {
                    in_degree[succ] -= 1;
                    if in_degree[succ] == 0 {
                        next.push(succ);
                    }
                }
            }

            emitted += frontier.len();
            trace!(level = levels.len(), width = frontier.len(), "Released level");
            levels.push(frontier.iter().map(|&i| ids[i].clone()).collect());
            frontier = next;
        }

        if emitted != ids.len() {
            return Err(Error::internal(format!(
                "topological levelling emitted {emitted} of {} tasks; the graph contains a cycle",
                ids.len()
            )));
        }

        Ok(Levels(levels))
    }

    /// Flat topological order of task ids.
    ///
    /// # Errors
    ///
    /// Same as [`TaskGraph::compute_levels`].
    pub fn topological_order(&self) -> Result<Vec<TaskId>> {
        Ok(self.compute_levels()?.into_inner().into_iter().flatten().collect())
    }
}
