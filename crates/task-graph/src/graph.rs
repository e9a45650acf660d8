//! Task graph store using petgraph.
//!
//! This module owns the tasks and dependency edges and enforces the graph's
//! invariants on every mutation: no self-loops, no duplicate edges and no
//! cycles. Edge insertions are vetoed before any state changes.

use crate::task::validate_task;
use crate::{Dependency, Error, Result, Task, TaskId};
use indexmap::{IndexMap, IndexSet};
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::Dfs;
use tracing::debug;

/// Task graph for dependency tracking and scheduling analysis.
///
/// Tasks and dependencies keep their insertion order, so every derived view
/// (levels, critical path, matrix, snapshot) is deterministic for a given
/// sequence of mutations.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    /// The directed graph of tasks. Stable so removal keeps other indices valid.
    graph: StableDiGraph<Task, ()>,
    /// Map from task ids to node indices, in insertion order.
    nodes: IndexMap<TaskId, NodeIndex>,
    /// Dependency edges in insertion order.
    edges: IndexSet<Dependency>,
}

impl TaskGraph {
    /// Create a new empty task graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            nodes: IndexMap::new(),
            edges: IndexSet::new(),
        }
    }

    /// Add a task with a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the name is blank or the duration is zero.
    pub fn add_task(&mut self, name: &str, duration: u64) -> Result<TaskId> {
        let name = validate_task(name, duration)?;
        let id = TaskId::generate();
        self.insert_task(Task {
            id: id.clone(),
            name,
            duration,
        })?;
        Ok(id)
    }

    /// Insert a task that already carries an id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the id is empty or already taken,
    /// or if the name or duration is invalid.
    pub(crate) fn insert_task(&mut self, task: Task) -> Result<()> {
        if task.id.as_str().is_empty() {
            return Err(Error::invalid_input("task id must not be empty"));
        }
        if self.nodes.contains_key(&task.id) {
            return Err(Error::invalid_input(format!(
                "task id '{}' is already in use",
                task.id
            )));
        }
        let name = validate_task(&task.name, task.duration)?;
        let task = Task { name, ..task };

        let id = task.id.clone();
        debug!(task = %id, name = %task.name, duration = task.duration, "Added task");
        let node = self.graph.add_node(task);
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Remove a task together with every dependency that touches it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no task has this id; the graph is unchanged.
    pub fn remove_task(&mut self, id: &TaskId) -> Result<Task> {
        let node = self.nodes.shift_remove(id).ok_or_else(|| Error::not_found(id))?;
        let before = self.edges.len();
        self.edges.retain(|dep| !dep.touches(id));

        let task = self
            .graph
            .remove_node(node)
            .ok_or_else(|| Error::internal(format!("task '{id}' had no graph node")))?;
        debug!(
            task = %id,
            removed_dependencies = before - self.edges.len(),
            "Removed task"
        );
        Ok(task)
    }

    /// Rename a task in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id or [`Error::InvalidInput`]
    /// for a blank name.
    pub fn rename_task(&mut self, id: &TaskId, name: &str) -> Result<()> {
        let task = self.task_mut(id)?;
        let name = validate_task(name, task.duration)?;
        debug!(task = %id, from = %task.name, to = %name, "Renamed task");
        task.name = name;
        Ok(())
    }

    /// Change the duration of a task.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown id or [`Error::InvalidInput`]
    /// for a zero duration.
    pub fn set_duration(&mut self, id: &TaskId, duration: u64) -> Result<()> {
        let task = self.task_mut(id)?;
        validate_task(&task.name, duration)?;
        debug!(task = %id, from = task.duration, to = duration, "Changed task duration");
        task.duration = duration;
        Ok(())
    }

    /// Add the dependency `from -> to` ("from must finish before to starts").
    ///
    /// The cheap checks (unknown ids, self-loop, duplicate) run before the
    /// reachability search. Nothing is mutated unless every check passes.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if either task is missing
    /// - [`Error::InvalidInput`] if `from == to`
    /// - [`Error::DuplicateEdge`] if the edge already exists
    /// - [`Error::CycleDetected`] if `to` already reaches `from`
    pub fn add_dependency(&mut self, from: &TaskId, to: &TaskId) -> Result<()> {
        let from_node = self.node(from)?;
        let to_node = self.node(to)?;

        if from == to {
            return Err(Error::invalid_input(format!(
                "task '{from}' cannot depend on itself"
            )));
        }

        let dep = Dependency::new(from.clone(), to.clone());
        if self.edges.contains(&dep) {
            return Err(Error::DuplicateEdge {
                from: dep.from,
                to: dep.to,
            });
        }

        if self.would_create_cycle(from, to) {
            debug!(from = %from, to = %to, "Rejected dependency that would close a cycle");
            return Err(Error::CycleDetected {
                from: dep.from,
                to: dep.to,
            });
        }

        self.graph.add_edge(from_node, to_node, ());
        self.edges.insert(dep);
        debug!(from = %from, to = %to, "Added dependency");
        Ok(())
    }

    /// Remove the dependency `from -> to` if present.
    ///
    /// Returns whether an edge was removed.
    pub fn remove_dependency(&mut self, from: &TaskId, to: &TaskId) -> bool {
        let dep = Dependency::new(from.clone(), to.clone());
        if !self.edges.shift_remove(&dep) {
            return false;
        }

        if let (Some(&a), Some(&b)) = (self.nodes.get(from), self.nodes.get(to))
            && let Some(edge) = self.graph.find_edge(a, b)
        {
            self.graph.remove_edge(edge);
        }
        debug!(from = %from, to = %to, "Removed dependency");
        true
    }

    /// Check whether adding `from -> to` would close a cycle.
    ///
    /// True iff `to` already reaches `from` along existing edges (or the two
    /// are the same task). Depth-first search from `to`, each node visited at
    /// most once. Unknown ids never form a cycle.
    #[must_use]
    pub fn would_create_cycle(&self, from: &TaskId, to: &TaskId) -> bool {
        if from == to {
            return true;
        }
        let (Some(&target), Some(&start)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return false;
        };

        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(node) = dfs.next(&self.graph) {
            if node == target {
                return true;
            }
        }
        false
    }

    /// Remove every task and dependency.
    pub fn clear(&mut self) {
        debug!(
            tasks = self.nodes.len(),
            dependencies = self.edges.len(),
            "Cleared task graph"
        );
        self.graph.clear();
        self.nodes.clear();
        self.edges.clear();
    }

    /// Get a task by id.
    #[must_use]
    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.nodes
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Iterate over all tasks in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.nodes
            .values()
            .filter_map(|&idx| self.graph.node_weight(idx))
    }

    /// Iterate over all dependencies in insertion order.
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.edges.iter()
    }

    /// All tasks with exactly this name, in insertion order.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Vec<&Task> {
        self.tasks().filter(|task| task.name == name).collect()
    }

    /// Direct predecessors of a task (edge sources), in dependency insertion order.
    #[must_use]
    pub fn predecessors(&self, id: &TaskId) -> Vec<&TaskId> {
        self.edges
            .iter()
            .filter(|dep| dep.to == *id)
            .map(|dep| &dep.from)
            .collect()
    }

    /// Direct successors of a task (edge targets), in dependency insertion order.
    #[must_use]
    pub fn successors(&self, id: &TaskId) -> Vec<&TaskId> {
        self.edges
            .iter()
            .filter(|dep| dep.from == *id)
            .map(|dep| &dep.to)
            .collect()
    }

    /// Check if a task exists in the graph.
    #[must_use]
    pub fn contains_task(&self, id: &TaskId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Check if the dependency `from -> to` exists.
    #[must_use]
    pub fn has_dependency(&self, from: &TaskId, to: &TaskId) -> bool {
        self.edges
            .contains(&Dependency::new(from.clone(), to.clone()))
    }

    /// Get the number of tasks in the graph.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of dependencies in the graph.
    #[must_use]
    pub fn dependency_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of a task in insertion order.
    pub(crate) fn position(&self, id: &TaskId) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    /// Adjacency lists indexed by task position, in dependency insertion order.
    ///
    /// Returns `(predecessors, successors)`.
    pub(crate) fn adjacency(&self) -> Result<(Vec<Vec<usize>>, Vec<Vec<usize>>)> {
        let mut preds = vec![Vec::new(); self.nodes.len()];
        let mut succs = vec![Vec::new(); self.nodes.len()];
        for dep in &self.edges {
            let (Some(from), Some(to)) = (self.position(&dep.from), self.position(&dep.to)) else {
                return Err(Error::internal(format!(
                    "dependency {dep} references a task that is not in the graph"
                )));
            };
            succs[from].push(to);
            preds[to].push(from);
        }
        Ok((preds, succs))
    }

    fn node(&self, id: &TaskId) -> Result<NodeIndex> {
        self.nodes.get(id).copied().ok_or_else(|| Error::not_found(id))
    }

    fn task_mut(&mut self, id: &TaskId) -> Result<&mut Task> {
        let node = self.node(id)?;
        self.graph
            .node_weight_mut(node)
            .ok_or_else(|| Error::internal(format!("task '{id}' had no graph node")))
    }
}

impl Default for TaskGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph_with(tasks: &[(&str, u64)]) -> (TaskGraph, Vec<TaskId>) {
        let mut graph = TaskGraph::new();
        let ids = tasks
            .iter()
            .map(|(name, duration)| graph.add_task(name, *duration).unwrap())
            .collect();
        (graph, ids)
    }

    #[test]
    fn test_task_graph_new() {
        let graph = TaskGraph::new();
        assert_eq!(graph.task_count(), 0);
        assert_eq!(graph.dependency_count(), 0);
        assert!(graph.is_empty());
    }

    #[test]
    fn test_add_task() {
        let mut graph = TaskGraph::new();
        let id = graph.add_task("  build ", 3).unwrap();

        let task = graph.task(&id).unwrap();
        assert_eq!(task.name, "build");
        assert_eq!(task.duration, 3);
        assert!(graph.contains_task(&id));
        assert_eq!(graph.task_count(), 1);
    }

    #[test]
    fn test_add_task_rejects_invalid_input() {
        let mut graph = TaskGraph::new();
        assert!(matches!(
            graph.add_task("", 1),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            graph.add_task("   ", 1),
            Err(Error::InvalidInput { .. })
        ));
        assert!(matches!(
            graph.add_task("build", 0),
            Err(Error::InvalidInput { .. })
        ));
        assert!(graph.is_empty());
    }

    #[test]
    fn test_duplicate_names_get_distinct_ids() {
        let (graph, ids) = graph_with(&[("build", 1), ("build", 2)]);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(graph.find_by_name("build").len(), 2);
    }

    #[test]
    fn test_add_dependency() {
        let (mut graph, ids) = graph_with(&[("a", 1), ("b", 1)]);
        graph.add_dependency(&ids[0], &ids[1]).unwrap();

        assert!(graph.has_dependency(&ids[0], &ids[1]));
        assert!(!graph.has_dependency(&ids[1], &ids[0]));
        assert_eq!(graph.successors(&ids[0]), vec![&ids[1]]);
        assert_eq!(graph.predecessors(&ids[1]), vec![&ids[0]]);
    }

    #[test]
    fn test_self_dependency_rejected() {
        let (mut graph, ids) = graph_with(&[("a", 1)]);
        assert!(matches!(
            graph.add_dependency(&ids[0], &ids[0]),
            Err(Error::InvalidInput { .. })
        ));
        assert_eq!(graph.dependency_count(), 0);
    }

    #[test]
    fn test_duplicate_dependency_rejected() {
        let (mut graph, ids) = graph_with(&[("a", 1), ("b", 1)]);
        graph.add_dependency(&ids[0], &ids[1]).unwrap();
        assert!(matches!(
            graph.add_dependency(&ids[0], &ids[1]),
            Err(Error::DuplicateEdge { .. })
        ));
        assert_eq!(graph.dependency_count(), 1);
    }

    #[test]
    fn test_reverse_dependency_is_cycle() {
        let (mut graph, ids) = graph_with(&[("a", 1), ("b", 1)]);
        graph.add_dependency(&ids[0], &ids[1]).unwrap();

        let err = graph.add_dependency(&ids[1], &ids[0]).unwrap_err();
        assert_eq!(
            err,
            Error::CycleDetected {
                from: ids[1].clone(),
                to: ids[0].clone()
            }
        );
        assert_eq!(graph.dependency_count(), 1);
    }

    #[test]
    fn test_transitive_cycle_rejected() {
        // a -> b -> c, then c -> a closes the loop
        let (mut graph, ids) = graph_with(&[("a", 1), ("b", 1), ("c", 1)]);
        graph.add_dependency(&ids[0], &ids[1]).unwrap();
        graph.add_dependency(&ids[1], &ids[2]).unwrap();

        assert!(graph.would_create_cycle(&ids[2], &ids[0]));
        assert!(matches!(
            graph.add_dependency(&ids[2], &ids[0]),
            Err(Error::CycleDetected { .. })
        ));
        // Shortcut edges in the same direction are fine
        assert!(!graph.would_create_cycle(&ids[0], &ids[2]));
        graph.add_dependency(&ids[0], &ids[2]).unwrap();
    }

    #[test]
    fn test_would_create_cycle_does_not_mutate() {
        let (mut graph, ids) = graph_with(&[("a", 1), ("b", 1)]);
        graph.add_dependency(&ids[0], &ids[1]).unwrap();

        let before: Vec<Dependency> = graph.dependencies().cloned().collect();
        assert!(graph.would_create_cycle(&ids[1], &ids[0]));
        assert!(!graph.would_create_cycle(&ids[0], &ids[1]));
        let after: Vec<Dependency> = graph.dependencies().cloned().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_dependency_on_missing_task() {
        let (mut graph, ids) = graph_with(&[("a", 1)]);
        let ghost = TaskId::from("ghost");
        assert_eq!(
            graph.add_dependency(&ids[0], &ghost),
            Err(Error::NotFound { id: ghost.clone() })
        );
        assert!(!graph.would_create_cycle(&ids[0], &ghost));
    }

    #[test]
    fn test_remove_task_cascades_to_incident_edges_only() {
        let (mut graph, ids) = graph_with(&[("a", 1), ("b", 1), ("c", 1), ("d", 1)]);
        graph.add_dependency(&ids[0], &ids[1]).unwrap();
        graph.add_dependency(&ids[1], &ids[2]).unwrap();
        graph.add_dependency(&ids[0], &ids[3]).unwrap();
        graph.add_dependency(&ids[2], &ids[3]).unwrap();

        let removed = graph.remove_task(&ids[1]).unwrap();
        assert_eq!(removed.name, "b");

        let remaining: Vec<Dependency> = graph.dependencies().cloned().collect();
        assert_eq!(
            remaining,
            vec![
                Dependency::new(ids[0].clone(), ids[3].clone()),
                Dependency::new(ids[2].clone(), ids[3].clone()),
            ]
        );
        // The petgraph side must agree: c no longer reachable from a
        assert!(!graph.would_create_cycle(&ids[2], &ids[0]));
    }

    #[test]
    fn test_remove_missing_task_is_not_found() {
        let (mut graph, _) = graph_with(&[("a", 1)]);
        let ghost = TaskId::from("ghost");
        assert_eq!(
            graph.remove_task(&ghost),
            Err(Error::NotFound { id: ghost })
        );
        assert_eq!(graph.task_count(), 1);
    }

    #[test]
    fn test_remove_task_keeps_order() {
        let (mut graph, ids) = graph_with(&[("a", 1), ("b", 1), ("c", 1)]);
        graph.remove_task(&ids[0]).unwrap();
        graph.add_task("d", 1).unwrap();

        let names: Vec<&str> = graph.tasks().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c", "d"]);
    }

    #[test]
    fn test_remove_dependency() {
        let (mut graph, ids) = graph_with(&[("a", 1), ("b", 1)]);
        graph.add_dependency(&ids[0], &ids[1]).unwrap();

        assert!(graph.remove_dependency(&ids[0], &ids[1]));
        assert!(!graph.remove_dependency(&ids[0], &ids[1]));
        assert_eq!(graph.dependency_count(), 0);

        // Reverse edge is allowed once the original is gone
        graph.add_dependency(&ids[1], &ids[0]).unwrap();
    }

    #[test]
    fn test_rename_and_set_duration() {
        let (mut graph, ids) = graph_with(&[("a", 1)]);
        graph.rename_task(&ids[0], "alpha").unwrap();
        graph.set_duration(&ids[0], 5).unwrap();

        let task = graph.task(&ids[0]).unwrap();
        assert_eq!(task.name, "alpha");
        assert_eq!(task.duration, 5);

        assert!(graph.rename_task(&ids[0], " ").is_err());
        assert!(graph.set_duration(&ids[0], 0).is_err());
        assert!(matches!(
            graph.set_duration(&TaskId::from("ghost"), 2),
            Err(Error::NotFound { .. })
        ));
        assert_eq!(graph.task(&ids[0]).unwrap().duration, 5);
    }

    #[test]
    fn test_clear() {
        let (mut graph, ids) = graph_with(&[("a", 1), ("b", 1)]);
        graph.add_dependency(&ids[0], &ids[1]).unwrap();
        graph.clear();

        assert!(graph.is_empty());
        assert_eq!(graph.dependency_count(), 0);
        assert!(!graph.contains_task(&ids[0]));
    }

    #[test]
    fn test_adjacency_positions() {
        let (mut graph, ids) = graph_with(&[("a", 1), ("b", 1), ("c", 1)]);
        graph.add_dependency(&ids[0], &ids[2]).unwrap();
        graph.add_dependency(&ids[1], &ids[2]).unwrap();

        let (preds, succs) = graph.adjacency().unwrap();
        assert_eq!(preds, vec![vec![], vec![], vec![0, 1]]);
        assert_eq!(succs, vec![vec![2], vec![2], vec![]]);
    }

    #[test]
    fn test_graph_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<TaskGraph>();
    }
}
