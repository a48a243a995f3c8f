// src/task.rs

//! The task record and the shapes used to create and patch it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Priority, Status};

/// Canonical task identifier type used throughout the crate.
pub type TaskId = u64;

/// A stored task.
///
/// `start_date` and `due_date` are plain calendar days. `dependencies` lists
/// the task's prerequisites: for every id `p` in it, this task must start
/// strictly after `p` is due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a task. The store assigns `id` and the
/// tracker stamps `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: Status,
    pub dependencies: Vec<TaskId>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, start_date: NaiveDate, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            start_date,
            due_date,
            priority: Priority::default(),
            status: Status::default(),
            dependencies: Vec::new(),
        }
    }

    pub(crate) fn into_task(self, id: TaskId, created_at: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            start_date: self.start_date,
            due_date: self.due_date,
            priority: self.priority,
            status: self.status,
            dependencies: dedup_ids(self.dependencies),
            created_at,
        }
    }
}

/// Partial update of a task. `None` leaves the field as it is.
///
/// `id` and `created_at` are immutable and therefore not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub dependencies: Option<Vec<TaskId>>,
}

impl TaskPatch {
    /// Patch that only moves a task's dates. This is the only kind of patch
    /// the propagation engine writes.
    pub fn dates(start_date: NaiveDate, due_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            due_date: Some(due_date),
            ..Self::default()
        }
    }

    pub fn due_date(due_date: NaiveDate) -> Self {
        Self {
            due_date: Some(due_date),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write the patched fields over `task`.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(start) = self.start_date {
            task.start_date = start;
        }
        if let Some(due) = self.due_date {
            task.due_date = due;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(ref deps) = self.dependencies {
            task.dependencies = dedup_ids(deps.clone());
        }
    }
}

/// Dependencies are a set; keep first occurrence order but drop repeats.
fn dedup_ids(ids: Vec<TaskId>) -> Vec<TaskId> {
    let mut out: Vec<TaskId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
