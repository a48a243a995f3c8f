// src/store/memory.rs

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::TaskStore;
use crate::dag::DependencyGraph;
use crate::errors::{Result, TrackerError};
use crate::task::{NewTask, Task, TaskId, TaskPatch};

#[derive(Debug, Default)]
struct Inner {
    tasks: BTreeMap<TaskId, Task>,
    /// Reverse index for `query_dependents`.
    graph: DependencyGraph,
    /// Last id handed out. Ids are never reused, even after removal.
    last_id: TaskId,
}

/// Thread-safe in-memory store.
///
/// Cloning is cheap and every clone shares the same tasks.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding exactly these tasks, keeping their ids.
    ///
    /// Later inserts continue after the highest id present. Nothing is
    /// validated: dangling dependencies and cycles are stored as given.
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let store = Self::new();
        for task in tasks {
            store.put(task);
        }
        store
    }

    /// Insert or overwrite a task verbatim, id included.
    pub fn put(&self, task: Task) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        inner.last_id = inner.last_id.max(task.id);
        inner.graph.insert(task.id, &task.dependencies);
        inner.tasks.insert(task.id, task);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| TrackerError::Store(anyhow!("in-memory task store lock poisoned")))
    }
}

impl TaskStore for InMemoryTaskStore {
    fn get(&self, id: TaskId) -> Result<Task> {
        let inner = self.lock()?;
        inner.tasks.get(&id).cloned().ok_or(TrackerError::NotFound(id))
    }

    fn query_dependents(&self, id: TaskId) -> Result<Vec<Task>> {
        let inner = self.lock()?;
        let mut dependents: Vec<Task> = inner
            .graph
            .dependents_of(id)
            .iter()
            .filter_map(|d| inner.tasks.get(d).cloned())
            .collect();
        dependents.sort_by_key(|t| t.id);
        Ok(dependents)
    }

    fn apply_patch(&self, id: TaskId, patch: &TaskPatch) -> Result<Task> {
        let mut inner = self.lock()?;
        let Inner { tasks, graph, .. } = &mut *inner;

        let task = tasks.get_mut(&id).ok_or(TrackerError::NotFound(id))?;
        patch.apply_to(task);
        if patch.dependencies.is_some() {
            graph.set_dependencies(id, &task.dependencies);
        }

        debug!(task = id, ?patch, "store: applied patch");
        Ok(task.clone())
    }

    fn insert(&self, task: NewTask, created_at: DateTime<Utc>) -> Result<Task> {
        let mut inner = self.lock()?;
        inner.last_id += 1;
        let id = inner.last_id;

        let task = task.into_task(id, created_at);
        inner.graph.insert(id, &task.dependencies);
        inner.tasks.insert(id, task.clone());

        debug!(task = id, "store: inserted task");
        Ok(task)
    }

    fn remove(&self, id: TaskId) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.tasks.remove(&id).is_none() {
            return Err(TrackerError::NotFound(id));
        }
        inner.graph.remove(id);

        debug!(task = id, "store: removed task");
        Ok(())
    }

    fn all(&self) -> Result<Vec<Task>> {
        let inner = self.lock()?;
        Ok(inner.tasks.values().cloned().collect())
    }

    fn contains(&self, id: TaskId) -> Result<bool> {
        Ok(self.lock()?.tasks.contains_key(&id))
    }

    fn count(&self) -> Result<usize> {
        Ok(self.lock()?.tasks.len())
    }
}
