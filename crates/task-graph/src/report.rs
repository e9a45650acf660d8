//! Derived views for display: adjacency matrix and analysis report.

use crate::{CriticalPath, Levels, Result, TaskGraph, TaskId, TaskTiming};
use serde::Serialize;
use std::fmt;

/// Adjacency matrix of the graph in task insertion order.
///
/// Cell `(i, j)` is set iff there is a dependency from task `i` to task `j`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdjacencyMatrix {
    /// Task ids labelling rows and columns.
    pub ids: Vec<TaskId>,
    /// Task names labelling rows and columns.
    pub names: Vec<String>,
    /// Row-major cells.
    pub cells: Vec<Vec<bool>>,
}

impl AdjacencyMatrix {
    /// Number of rows (and columns).
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the matrix has no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether there is an edge from row `from` to column `to`.
    #[must_use]
    pub fn get(&self, from: usize, to: usize) -> bool {
        self.cells
            .get(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(false)
    }

    /// Render as a table of strings with a header row and header column of
    /// task names. The corner cell is empty and edges are `"1"` / `"0"`.
    #[must_use]
    pub fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.len() + 1);

        let mut header = Vec::with_capacity(self.len() + 1);
        header.push(String::new());
        header.extend(self.names.iter().cloned());
        rows.push(header);

        for (name, cells) in self.names.iter().zip(&self.cells) {
            let mut row = Vec::with_capacity(self.len() + 1);
            row.push(name.clone());
            row.extend(cells.iter().map(|&cell| if cell { "1" } else { "0" }.to_string()));
            rows.push(row);
        }
        rows
    }
}

impl fmt::Display for AdjacencyMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.rows();
        let columns = rows.first().map_or(0, Vec::len);
        let widths: Vec<usize> = (0..columns)
            .map(|col| {
                rows.iter()
                    .map(|row| row[col].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for row in &rows {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// One row of the timing table in an [`AnalysisReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingRow {
    /// Task id.
    pub id: TaskId,
    /// Task name.
    pub name: String,
    /// Task duration.
    pub duration: u64,
    /// Level the task was placed in.
    pub level: usize,
    /// CPM timing.
    #[serde(flatten)]
    pub timing: TaskTiming,
    /// Whether the task is critical.
    pub critical: bool,
}

/// Everything a front end needs to display a full analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    /// Task names grouped by level.
    pub levels: Vec<Vec<String>>,
    /// Task names in flat topological order.
    pub topological_order: Vec<String>,
    /// Names of zero-slack tasks, in task insertion order.
    pub critical_path: Vec<String>,
    /// Length of the longest chain.
    pub project_duration: u64,
    /// Largest number of tasks in a single level.
    pub max_parallelism: usize,
    /// Per-task timing, in task insertion order.
    pub timings: Vec<TimingRow>,
    /// Adjacency matrix.
    pub matrix: AdjacencyMatrix,
}

impl AnalysisReport {
    /// Topological order joined with arrows.
    #[must_use]
    pub fn topological_summary(&self) -> String {
        self.topological_order.join(" → ")
    }

    /// Critical tasks joined with arrows.
    #[must_use]
    pub fn critical_summary(&self) -> String {
        self.critical_path.join(" → ")
    }
}

impl TaskGraph {
    /// Build the adjacency matrix in task insertion order.
    #[must_use]
    pub fn adjacency_matrix(&self) -> AdjacencyMatrix {
        let n = self.task_count();
        let mut cells = vec![vec![false; n]; n];
        for dep in self.dependencies() {
            if let (Some(from), Some(to)) = (self.position(&dep.from), self.position(&dep.to)) {
                cells[from][to] = true;
            }
        }

        AdjacencyMatrix {
            ids: self.tasks().map(|task| task.id.clone()).collect(),
            names: self.tasks().map(|task| task.name.clone()).collect(),
            cells,
        }
    }

    /// Run every analysis and bundle the results by task name.
    ///
    /// # Errors
    ///
    /// Propagates errors from levelling and the critical path analysis.
    pub fn analysis_report(&self) -> Result<AnalysisReport> {
        let levels = self.compute_levels()?;
        let cpm = self.critical_path(&levels)?;
        Ok(self.build_report(&levels, &cpm))
    }

    fn build_report(&self, levels: &Levels, cpm: &CriticalPath) -> AnalysisReport {
        let name_of = |id: &TaskId| {
            self.task(id)
                .map_or_else(|| id.to_string(), |task| task.name.clone())
        };

        let timings = self
            .tasks()
            .map(|task| {
                let timing = cpm.timing(&task.id).copied().unwrap_or_default();
                TimingRow {
                    id: task.id.clone(),
                    name: task.name.clone(),
                    duration: task.duration,
                    level: levels.level_of(&task.id).unwrap_or(0),
                    timing,
                    critical: timing.is_critical(),
                }
            })
            .collect();

        AnalysisReport {
            levels: levels
                .iter()
                .map(|level| level.iter().map(name_of).collect())
                .collect(),
            topological_order: levels.flatten().into_iter().map(name_of).collect(),
            critical_path: cpm.critical_tasks().iter().map(name_of).collect(),
            project_duration: cpm.project_duration(),
            max_parallelism: levels.max_width(),
            timings,
            matrix: self.adjacency_matrix(),
        }
    }
}
