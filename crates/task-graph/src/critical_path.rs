//! Critical path method (CPM) over a levelled task graph.
//!
//! The forward pass walks the flattened level order and pushes every task's
//! early start to the latest finish among its predecessors. The backward pass
//! walks the same order in reverse and pulls every task's late finish down to
//! the earliest late start among its successors. Tasks whose late and early
//! start coincide have no slack and form the critical set.

use crate::{Dependency, Error, Levels, Result, TaskGraph, TaskId};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// Scheduling window of a single task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskTiming {
    /// Earliest time the task can start.
    pub early_start: u64,
    /// `early_start + duration`.
    pub early_finish: u64,
    /// Latest start that does not delay the project.
    pub late_start: u64,
    /// `late_start + duration`.
    pub late_finish: u64,
    /// `late_start - early_start`.
    pub slack: u64,
}

impl TaskTiming {
    /// A task is critical when it has no slack.
    #[must_use]
    pub const fn is_critical(&self) -> bool {
        self.slack == 0
    }
}

/// Result of a CPM analysis.
///
/// The critical tasks are a set: several chains may tie for the longest
/// duration, so they need not form a single linear path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CriticalPath {
    project_duration: u64,
    timings: IndexMap<TaskId, TaskTiming>,
    critical: Vec<TaskId>,
    critical_dependencies: Vec<Dependency>,
}

impl CriticalPath {
    /// Total project duration: the latest early finish of any task.
    #[must_use]
    pub const fn project_duration(&self) -> u64 {
        self.project_duration
    }

    /// Timing of a single task.
    #[must_use]
    pub fn timing(&self, id: &TaskId) -> Option<&TaskTiming> {
        self.timings.get(id)
    }

    /// Timings of every task, in task insertion order.
    pub fn timings(&self) -> impl Iterator<Item = (&TaskId, &TaskTiming)> {
        self.timings.iter()
    }

    /// Zero-slack tasks, in task insertion order.
    #[must_use]
    pub fn critical_tasks(&self) -> &[TaskId] {
        &self.critical
    }

    /// Whether a task is on the critical path.
    #[must_use]
    pub fn is_critical(&self, id: &TaskId) -> bool {
        self.timings.get(id).is_some_and(TaskTiming::is_critical)
    }

    /// Edges between critical tasks with no gap between finish and start.
    #[must_use]
    pub fn critical_dependencies(&self) -> &[Dependency] {
        &self.critical_dependencies
    }
}

impl TaskGraph {
    /// Run the CPM forward and backward passes over the given levels.
    ///
    /// `levels` must be the current output of [`TaskGraph::compute_levels`]:
    /// it has to list every task exactly once and put each task after all of
    /// its predecessors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InternalConsistency`] if the levels do not match the
    /// graph, or [`Error::InvalidInput`] if a finish time does not fit in `u64`.
    pub fn critical_path(&self, levels: &Levels) -> Result<CriticalPath> {
        let order = self.level_positions(levels)?;
        let durations: Vec<u64> = self.tasks().map(|task| task.duration).collect();
        let (preds, succs) = self.adjacency()?;

        let mut early_start = vec![0; durations.len()];
        let mut early_finish = durations.clone();
        for &task in &order {
            for &pred in &preds[task] {
                if early_finish[pred] > early_start[task] {
                    early_start[task] = early_finish[pred];
                    early_finish[task] = early_start[task]
                        .checked_add(durations[task])
                        .ok_or_else(|| self.overflow(task))?;
                }
            }
        }

        let project_duration = early_finish.iter().copied().max().unwrap_or(0);

        let mut late_finish = vec![project_duration; durations.len()];
        let mut late_start: Vec<u64> = durations.iter().map(|d| project_duration - d).collect();
        for &task in order.iter().rev() {
            for &succ in &succs[task] {
                if late_start[succ] < late_finish[task] {
                    late_finish[task] = late_start[succ];
                    late_start[task] = late_finish[task] - durations[task];
                }
            }
        }

        let mut timings = IndexMap::with_capacity(durations.len());
        let mut critical = Vec::new();
        for (i, task) in self.tasks().enumerate() {
            let timing = TaskTiming {
                early_start: early_start[i],
                early_finish: early_finish[i],
                late_start: late_start[i],
                late_finish: late_finish[i],
                slack: late_start[i] - early_start[i],
            };
            if timing.is_critical() {
                critical.push(task.id.clone());
            }
            timings.insert(task.id.clone(), timing);
        }

        let critical_dependencies = self
            .dependencies()
            .filter(|dep| match (timings.get(&dep.from), timings.get(&dep.to)) {
                (Some(from), Some(to)) => {
                    from.is_critical() && to.is_critical() && from.early_finish == to.early_start
                }
                _ => false,
            })
            .cloned()
            .collect();

        debug!(
            project_duration,
            critical = critical.len(),
            tasks = timings.len(),
            "Computed critical path"
        );

        Ok(CriticalPath {
            project_duration,
            timings,
            critical,
            critical_dependencies,
        })
    }

    /// Compute levels and run the critical path analysis on them.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`TaskGraph::compute_levels`].
    pub fn analyze_critical_path(&self) -> Result<CriticalPath> {
        let levels = self.compute_levels()?;
        self.critical_path(&levels)
    }

    fn overflow(&self, position: usize) -> Error {
        let name = self
            .tasks()
            .nth(position)
            .map_or_else(String::new, |task| task.name.clone());
        Error::invalid_input(format!(
            "schedule overflows: task '{name}' would finish after time {}",
            u64::MAX
        ))
    }

    /// Translate levels into task positions, checking they fit this graph.
    fn level_positions(&self, levels: &Levels) -> Result<Vec<usize>> {
        let mut order = Vec::with_capacity(self.task_count());
        let mut rank = vec![None; self.task_count()];

        for id in levels.flatten() {
            let pos = self.position(id).ok_or_else(|| {
                Error::internal(format!("levels reference unknown task '{id}'"))
            })?;
            if rank[pos].is_some() {
                return Err(Error::internal(format!("levels list task '{id}' twice")));
            }
            rank[pos] = Some(order.len());
            order.push(pos);
        }

        if order.len() != self.task_count() {
            return Err(Error::internal(format!(
                "levels cover {} of {} tasks",
                order.len(),
                self.task_count()
            )));
        }

        for dep in self.dependencies() {
            let from = self.position(&dep.from).and_then(|p| rank[p]);
            let to = self.position(&dep.to).and_then(|p| rank[p]);
            if !matches!((from, to), (Some(f), Some(t)) if f < t) {
                return Err(Error::internal(format!(
                    "levels place dependency {dep} out of order"
                )));
            }
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph() {
        let graph = TaskGraph::new();
        let cpm = graph.analyze_critical_path().unwrap();
        assert_eq!(cpm.project_duration(), 0);
        assert!(cpm.critical_tasks().is_empty());
        assert_eq!(cpm.timings().count(), 0);
    }

    #[test]
    fn test_join_on_longest_predecessor() {
        // A(3), B(2), C(4); A -> C, B -> C
        let mut graph = TaskGraph::new();
        let a = graph.add_task("A", 3).unwrap();
        let b = graph.add_task("B", 2).unwrap();
        let c = graph.add_task("C", 4).unwrap();
        graph.add_dependency(&a, &c).unwrap();
        graph.add_dependency(&b, &c).unwrap();

        let cpm = graph.analyze_critical_path().unwrap();

        let ta = cpm.timing(&a).unwrap();
        assert_eq!((ta.early_start, ta.early_finish), (0, 3));
        let tb = cpm.timing(&b).unwrap();
        assert_eq!((tb.early_start, tb.early_finish), (0, 2));
        let tc = cpm.timing(&c).unwrap();
        assert_eq!((tc.early_start, tc.early_finish), (3, 7));

        assert_eq!(cpm.project_duration(), 7);
        assert_eq!(ta.slack, 0);
        assert_eq!(tb.slack, 1);
        assert_eq!(tc.slack, 0);
        assert_eq!(cpm.critical_tasks(), &[a.clone(), c.clone()]);
        assert!(!cpm.is_critical(&b));
        assert_eq!(cpm.critical_dependencies(), &[Dependency::new(a, c)]);
    }

    #[test]
    fn test_late_times_of_non_critical_branch() {
        // start(2) -> long(5) -> end(1), start -> short(1) -> end
        let mut graph = TaskGraph::new();
        let start = graph.add_task("start", 2).unwrap();
        let long = graph.add_task("long", 5).unwrap();
        let short = graph.add_task("short", 1).unwrap();
        let end = graph.add_task("end", 1).unwrap();
        graph.add_dependency(&start, &long).unwrap();
        graph.add_dependency(&start, &short).unwrap();
        graph.add_dependency(&long, &end).unwrap();
        graph.add_dependency(&short, &end).unwrap();

        let cpm = graph.analyze_critical_path().unwrap();
        assert_eq!(cpm.project_duration(), 8);

        let s = cpm.timing(&short).unwrap();
        assert_eq!(
            *s,
            TaskTiming {
                early_start: 2,
                early_finish: 3,
                late_start: 6,
                late_finish: 7,
                slack: 4,
            }
        );
        assert_eq!(cpm.critical_tasks(), &[start, long, end]);
    }

    #[test]
    fn test_tied_chains_are_all_critical() {
        let mut graph = TaskGraph::new();
        let a = graph.add_task("a", 2).unwrap();
        let b = graph.add_task("b", 2).unwrap();
        let c = graph.add_task("c", 1).unwrap();
        let d = graph.add_task("d", 1).unwrap();
        graph.add_dependency(&a, &c).unwrap();
        graph.add_dependency(&b, &d).unwrap();

        let cpm = graph.analyze_critical_path().unwrap();
        assert_eq!(cpm.project_duration(), 3);
        assert_eq!(cpm.critical_tasks().len(), 4);
        assert_eq!(cpm.critical_dependencies().len(), 2);
    }

    #[test]
    fn test_isolated_short_task_has_slack() {
        let mut graph = TaskGraph::new();
        let long = graph.add_task("long", 10).unwrap();
        let short = graph.add_task("short", 3).unwrap();

        let cpm = graph.analyze_critical_path().unwrap();
        assert!(cpm.is_critical(&long));
        let timing = cpm.timing(&short).unwrap();
        assert_eq!(timing.late_start, 7);
        assert_eq!(timing.late_finish, 10);
        assert_eq!(timing.slack, 7);
    }

    #[test]
    fn test_stale_levels_rejected() {
        let mut graph = TaskGraph::new();
        let a = graph.add_task("a", 1).unwrap();
        let levels = graph.compute_levels().unwrap();
        let b = graph.add_task("b", 1).unwrap();

        assert!(matches!(
            graph.critical_path(&levels),
            Err(Error::InternalConsistency { .. })
        ));

        // Both tasks listed but in the wrong order for a -> b
        graph.add_dependency(&a, &b).unwrap();
        let reversed = Levels::from(vec![vec![b], vec![a]]);
        assert!(matches!(
            graph.critical_path(&reversed),
            Err(Error::InternalConsistency { .. })
        ));
    }

    #[test]
    fn test_finish_time_overflow_is_rejected() {
        let mut graph = TaskGraph::new();
        let a = graph.add_task("a", u64::MAX).unwrap();
        let b = graph.add_task("b", 1).unwrap();
        graph.add_dependency(&a, &b).unwrap();

        let err = graph.analyze_critical_path().unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
        assert!(err.to_string().contains("overflows"));
        assert!(graph.analysis_report().is_err());
    }

    #[test]
    fn test_largest_duration_alone_fits() {
        let mut graph = TaskGraph::new();
        let a = graph.add_task("a", u64::MAX).unwrap();

        let cpm = graph.analyze_critical_path().unwrap();
        assert_eq!(cpm.project_duration(), u64::MAX);
        assert_eq!(cpm.critical_tasks(), &[a]);
    }
}
