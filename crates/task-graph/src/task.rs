//! Task and dependency value types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, unique identifier of a task.
///
/// Fresh ids are random UUID v4 strings. Ids read back from a snapshot are
/// kept verbatim, so any non-empty string is a valid id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for TaskId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A unit of work with a fixed duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique id of the task.
    pub id: TaskId,
    /// Display name. Not required to be unique.
    pub name: String,
    /// Duration in whole time units, at least 1.
    pub duration: u64,
}

/// A directed edge: `from` must complete before `to` starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// The task that must finish first.
    pub from: TaskId,
    /// The task that waits for `from`.
    pub to: TaskId,
}

impl Dependency {
    /// Create a dependency edge.
    #[must_use]
    pub fn new(from: impl Into<TaskId>, to: impl Into<TaskId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Whether `id` is either endpoint of this edge.
    #[must_use]
    pub fn touches(&self, id: &TaskId) -> bool {
        self.from == *id || self.to == *id
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Validate a task name and duration, returning the trimmed name.
pub(crate) fn validate_task(name: &str, duration: u64) -> crate::Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(crate::Error::invalid_input("task name must not be empty"));
    }
    if duration < 1 {
        return Err(crate::Error::invalid_input(format!(
            "duration of task '{name}' must be at least 1"
        )));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().is_empty());
    }

    #[test]
    fn test_task_id_serializes_as_plain_string() {
        let id = TaskId::from("1712345678901");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"1712345678901\"");
    }

    #[test]
    fn test_validate_task() {
        assert_eq!(validate_task("  build ", 2).unwrap(), "build");
        assert!(validate_task("   ", 2).is_err());
        assert!(validate_task("build", 0).is_err());
    }

    #[test]
    fn test_dependency_touches() {
        let dep = Dependency::new("a", "b");
        assert!(dep.touches(&TaskId::from("a")));
        assert!(dep.touches(&TaskId::from("b")));
        assert!(!dep.touches(&TaskId::from("c")));
        assert_eq!(dep.to_string(), "a -> b");
    }
}
