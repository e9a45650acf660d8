//! JSON file store for the task graph.
//!
//! The whole graph is one [`GraphSnapshot`] document. Saves go through a
//! temporary file in the same directory and are renamed into place, so a
//! crashed write never leaves a truncated store behind.

use crate::errors::CliError;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use taskdag_graph::{GraphSnapshot, TaskGraph};
use tracing::{debug, warn};

/// File name used when no store path is configured.
pub const DEFAULT_STORE_FILE: &str = "graph.json";

/// Location of the persisted graph.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Use the given file as the store.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The default store: `<data_dir>/taskdag/graph.json`, or
    /// `./taskdag.json` on platforms without a data directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::data_dir().map_or_else(
            || PathBuf::from("taskdag.json"),
            |dir| dir.join("taskdag").join(DEFAULT_STORE_FILE),
        )
    }

    /// Path of the store file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the graph. A missing or blank file is an empty graph.
    ///
    /// Entries the engine rejects are dropped with a warning, so a store
    /// edited by hand still loads.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Store`] if the file cannot be read or is not valid JSON.
    pub fn load(&self) -> Result<TaskGraph, CliError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Store does not exist yet");
                return Ok(TaskGraph::new());
            }
            Err(e) => return Err(CliError::store(&self.path, format!("read failed: {e}"))),
        };

        if content.trim().is_empty() {
            return Ok(TaskGraph::new());
        }

        let snapshot: GraphSnapshot = serde_json::from_str(&content)
            .map_err(|e| CliError::store(&self.path, format!("invalid JSON: {e}")))?;
        let (graph, rejected) = TaskGraph::from_snapshot(snapshot);
        if !rejected.is_empty() {
            warn!(
                path = %self.path.display(),
                dropped = rejected.len(),
                "Store contained entries that were dropped"
            );
        }
        Ok(graph)
    }

    /// Write the graph back to the store.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Store`] if the directory or file cannot be written.
    pub fn save(&self, graph: &TaskGraph) -> Result<(), CliError> {
        let json = serde_json::to_string_pretty(&graph.to_snapshot())
            .map_err(|e| CliError::store(&self.path, format!("serialization failed: {e}")))?;

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|e| CliError::store(&self.path, format!("cannot create directory: {e}")))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| CliError::store(&self.path, format!("cannot create temp file: {e}")))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.write_all(b"\n"))
            .map_err(|e| CliError::store(&self.path, format!("write failed: {e}")))?;
        tmp.persist(&self.path)
            .map_err(|e| CliError::store(&self.path, format!("write failed: {}", e.error)))?;

        debug!(
            path = %self.path.display(),
            tasks = graph.task_count(),
            dependencies = graph.dependency_count(),
            "Saved store"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_empty_graph() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("nope.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = Store::new(dir.path().join("nested").join("graph.json"));

        let mut graph = TaskGraph::new();
        let a = graph.add_task("a", 2).unwrap();
        let b = graph.add_task("b", 3).unwrap();
        graph.add_dependency(&a, &b).unwrap();
        store.save(&graph).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.to_snapshot(), graph.to_snapshot());
    }

    #[test]
    fn test_invalid_json_is_store_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Store::new(&path).load().unwrap_err();
        assert!(matches!(err, CliError::Store { .. }));
    }

    #[test]
    fn test_dangling_dependency_is_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.json");
        fs::write(
            &path,
            r#"{"tasks":[{"id":"1","name":"a","duration":1}],"dependencies":[{"from":"1","to":"2"}]}"#,
        )
        .unwrap();

        let graph = Store::new(&path).load().unwrap();
        assert_eq!(graph.task_count(), 1);
        assert_eq!(graph.dependency_count(), 0);
    }
}
