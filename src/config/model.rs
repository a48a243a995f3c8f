// src/config/model.rs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::PropagationOptions;
use crate::store::InMemoryTaskStore;
use crate::task::{Task, TaskId};
use crate::types::{CycleBehaviour, Priority, Status};

/// Task file as read from TOML, before validation.
///
/// ```toml
/// [config]
/// max_cascade_depth = 50
/// on_cycle = "warn"
///
/// [task.1]
/// title = "Design"
/// start_date = "2024-01-01"
/// due_date = "2024-01-10"
///
/// [task.2]
/// title = "Build"
/// start_date = "2024-01-11"
/// due_date = "2024-01-20"
/// dependencies = [1]
/// ```
///
/// All sections are optional at the serde level; validation requires at
/// least one task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTaskFile {
    /// Engine behaviour from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<id>]`. Keys must be positive integers.
    #[serde(default)]
    pub task: BTreeMap<String, TaskEntry>,
}

/// `[config]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSection {
    /// Maximum cascade depth. If absent, the number of tasks is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cascade_depth: Option<usize>,

    /// `"error"` (default) or `"warn"`.
    #[serde(default)]
    pub on_cycle: CycleBehaviour,
}

impl ConfigSection {
    pub fn propagation_options(&self) -> PropagationOptions {
        PropagationOptions {
            max_depth: self.max_cascade_depth,
            on_cycle: self.on_cycle,
        }
    }
}

/// `[task.<id>]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Quoted `YYYY-MM-DD`.
    pub start_date: NaiveDate,

    /// Quoted `YYYY-MM-DD`.
    pub due_date: NaiveDate,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub status: Status,

    /// Ids of prerequisite tasks.
    #[serde(default)]
    pub dependencies: Vec<TaskId>,

    /// RFC 3339 timestamp. Filled with the load time when missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Task> for TaskEntry {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            start_date: task.start_date,
            due_date: task.due_date,
            priority: task.priority,
            status: task.status,
            dependencies: task.dependencies.clone(),
            created_at: Some(task.created_at),
        }
    }
}

/// A validated task file.
///
/// Constructed through `TryFrom<RawTaskFile>` (see `config::validate`), so
/// every dependency points at a task in the file and the graph is acyclic.
#[derive(Debug, Clone)]
pub struct TaskFile {
    pub config: ConfigSection,
    tasks: Vec<Task>,
}

impl TaskFile {
    pub(crate) fn new_unchecked(config: ConfigSection, tasks: Vec<Task>) -> Self {
        Self { config, tasks }
    }

    /// Tasks in ascending id order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Seed a fresh in-memory store, keeping the file's ids.
    pub fn into_store(self) -> InMemoryTaskStore {
        InMemoryTaskStore::with_tasks(self.tasks)
    }

    /// Raw form of a store snapshot, ready to be written back to disk.
    pub fn to_raw(config: &ConfigSection, tasks: &[Task]) -> RawTaskFile {
        RawTaskFile {
            config: config.clone(),
            task: tasks
                .iter()
                .map(|t| (t.id.to_string(), TaskEntry::from(t)))
                .collect(),
        }
    }
}
