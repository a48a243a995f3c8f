use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use taskshift::errors::{Result, TrackerError};
use taskshift::store::{InMemoryTaskStore, TaskStore};
use taskshift::task::{NewTask, Task, TaskId, TaskPatch};

/// A store that:
/// - delegates to an `InMemoryTaskStore`
/// - records every patch written through it
/// - can be told to fail patches for given ids, like a broken backend
/// - can be told to stall after patching given ids, like a slow one.
#[derive(Debug, Clone, Default)]
pub struct RecordingStore {
    inner: InMemoryTaskStore,
    patches: Arc<Mutex<Vec<(TaskId, TaskPatch)>>>,
    failing: Arc<Mutex<HashSet<TaskId>>>,
    stalls: Arc<Mutex<HashMap<TaskId, Duration>>>,
}

impl RecordingStore {
    pub fn new(inner: InMemoryTaskStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// All patches written so far, in order.
    pub fn patches(&self) -> Vec<(TaskId, TaskPatch)> {
        self.patches.lock().unwrap().clone()
    }

    /// Ids that received a patch, in order (with repeats).
    pub fn patched_ids(&self) -> Vec<TaskId> {
        self.patches().into_iter().map(|(id, _)| id).collect()
    }

    pub fn clear(&self) {
        self.patches.lock().unwrap().clear();
    }

    pub fn fail_patches_for(&self, id: TaskId) {
        self.failing.lock().unwrap().insert(id);
    }

    /// Sleep for `pause` after each successful patch of `id`.
    pub fn stall_after_patching(&self, id: TaskId, pause: Duration) {
        self.stalls.lock().unwrap().insert(id, pause);
    }
}

impl TaskStore for RecordingStore {
    fn get(&self, id: TaskId) -> Result<Task> {
        self.inner.get(id)
    }

    fn query_dependents(&self, id: TaskId) -> Result<Vec<Task>> {
        self.inner.query_dependents(id)
    }

    fn apply_patch(&self, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        if self.failing.lock().unwrap().contains(&id) {
            return Err(TrackerError::Store(anyhow!("simulated write failure for task {id}")));
        }
        let patched = self.inner.apply_patch(id, patch)?;
        self.patches.lock().unwrap().push((id, patch.clone()));

        let stall = self.stalls.lock().unwrap().get(&id).copied();
        if let Some(pause) = stall {
            thread::sleep(pause);
        }
        Ok(patched)
    }

    fn insert(&self, task: NewTask, created_at: DateTime<Utc>) -> Result<Task> {
        self.inner.insert(task, created_at)
    }

    fn remove(&self, id: TaskId) -> Result<()> {
        self.inner.remove(id)
    }

    fn all(&self) -> Result<Vec<Task>> {
        self.inner.all()
    }
}
