// src/store/mod.rs

//! Storage contract used by the tracker and the propagation engine.
//!
//! The engine only needs three things from storage: read a task, list the
//! tasks that depend on a task, and write a date patch. The façade needs a
//! few more (insert, remove, list). Durable persistence is left to whoever
//! implements [`TaskStore`]; this crate ships [`memory::InMemoryTaskStore`].

use std::fmt::Debug;

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::task::{NewTask, Task, TaskId, TaskPatch};

pub mod memory;

pub use memory::InMemoryTaskStore;

/// Abstract task storage.
///
/// Implementations must give read-your-writes consistency: a task read after
/// `apply_patch` returns reflects the patch. Missing ids are reported as
/// [`TrackerError::NotFound`](crate::errors::TrackerError::NotFound); any
/// backend failure should be returned as
/// [`TrackerError::Store`](crate::errors::TrackerError::Store).
pub trait TaskStore: Send + Sync + Debug {
    /// Read a single task.
    fn get(&self, id: TaskId) -> Result<Task>;

    /// All existing tasks whose dependency set contains `id`.
    fn query_dependents(&self, id: TaskId) -> Result<Vec<Task>>;

    /// Write `patch` over the task and return the updated record.
    fn apply_patch(&self, id: TaskId, patch: &TaskPatch) -> Result<Task>;

    /// Persist a new task, assigning its id.
    fn insert(&self, task: NewTask, created_at: DateTime<Utc>) -> Result<Task>;

    /// Remove a task. Dependents are not touched.
    fn remove(&self, id: TaskId) -> Result<()>;

    /// Every task, in ascending id order.
    fn all(&self) -> Result<Vec<Task>>;

    fn contains(&self, id: TaskId) -> Result<bool> {
        match self.get(id) {
            Ok(_) => Ok(true),
            Err(crate::errors::TrackerError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn count(&self) -> Result<usize> {
        Ok(self.all()?.len())
    }
}
