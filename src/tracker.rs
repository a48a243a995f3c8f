// src/tracker.rs

//! Task CRUD façade.
//!
//! [`TaskTracker`] is what a host service talks to. It validates input,
//! delegates storage to a [`TaskStore`], and runs the propagation engine
//! whenever an update moves a due date, before returning. Callers therefore
//! always observe a settled graph (or an error describing why it is not).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::dag::DependencyGraph;
use crate::engine::{PropagationOptions, PropagationReport, Propagator};
use crate::errors::{Result, TrackerError};
use crate::store::TaskStore;
use crate::task::{NewTask, Task, TaskId, TaskPatch};

/// Result of [`TaskTracker::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The task as stored after the patch.
    pub task: Task,
    /// Present when the patch moved the due date and a cascade ran.
    pub propagation: Option<PropagationReport>,
}

impl UpdateOutcome {
    /// Ids of dependents the cascade moved (empty if none ran).
    pub fn shifted_ids(&self) -> Vec<TaskId> {
        self.propagation
            .as_ref()
            .map(|r| r.changed_ids())
            .unwrap_or_default()
    }
}

/// A prerequisite -> dependent edge whose dependent starts on or before the
/// prerequisite's due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsettledEdge {
    pub prerequisite: TaskId,
    pub prerequisite_due: NaiveDate,
    pub dependent: TaskId,
    pub dependent_start: NaiveDate,
}

/// CRUD façade over a task store.
///
/// Every call holds one tracker-wide lock for its whole duration, cascade
/// included, so two cascades never interleave their read-then-write steps and
/// readers never see a half-applied cascade. The tracker is `Sync` and can be
/// shared behind an `Arc`.
#[derive(Debug)]
pub struct TaskTracker<S: TaskStore> {
    store: S,
    options: PropagationOptions,
    cascade_lock: Mutex<()>,
}

impl<S: TaskStore> TaskTracker<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, PropagationOptions::default())
    }

    pub fn with_options(store: S, options: PropagationOptions) -> Self {
        Self {
            store,
            options,
            cascade_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> PropagationOptions {
        self.options
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no bad state.
        self.cascade_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a new task. Its dependencies must all exist.
    ///
    /// No cascade runs: a new task has no previous due date to compare with.
    pub fn create(&self, task: NewTask) -> Result<Task> {
        let _guard = self.lock();

        for dep in task.dependencies.iter().copied() {
            if !self.store.contains(dep)? {
                return Err(TrackerError::UnknownDependency {
                    task: None,
                    dependency: dep,
                });
            }
        }

        let created = self.store.insert(task, Utc::now())?;
        info!(task = created.id, title = %created.title, "created task");
        Ok(created)
    }

    /// Patch a task. If the patch carries a due date different from the
    /// stored one, the cascade runs after the patch is persisted.
    pub fn update(&self, id: TaskId, patch: TaskPatch) -> Result<UpdateOutcome> {
        let _guard = self.lock();

        let original = self.store.get(id)?;
        if let Some(ref deps) = patch.dependencies {
            self.validate_dependencies(id, deps)?;
        }

        if patch.is_empty() {
            debug!(task = id, "empty patch; nothing to persist");
            return Ok(UpdateOutcome {
                task: original,
                propagation: None,
            });
        }

        let task = self.store.apply_patch(id, &patch)?;
        debug!(task = id, "persisted update");

        let propagation = match patch.due_date {
            Some(new_due) if new_due != original.due_date => {
                info!(
                    task = id,
                    old_due = %original.due_date,
                    %new_due,
                    "due date moved; propagating to dependents"
                );
                Some(self.run_propagation(id, original.due_date, new_due)?)
            }
            _ => None,
        };

        Ok(UpdateOutcome { task, propagation })
    }

    /// Remove a task. Dependents keep their (now dangling) reference.
    pub fn delete(&self, id: TaskId) -> Result<()> {
        let _guard = self.lock();
        self.store.remove(id)?;
        info!(task = id, "deleted task");
        Ok(())
    }

    /// Tasks whose title contains `title`, or is contained in it, ignoring
    /// case.
    pub fn find_similar(&self, title: &str) -> Result<Vec<Task>> {
        let _guard = self.lock();
        let needle = title.to_lowercase();
        let matches: Vec<Task> = self
            .store
            .all()?
            .into_iter()
            .filter(|t| {
                let candidate = t.title.to_lowercase();
                candidate.contains(&needle) || needle.contains(&candidate)
            })
            .collect();

        debug!(query = %title, matches = matches.len(), "similarity lookup");
        Ok(matches)
    }

    pub fn get(&self, id: TaskId) -> Result<Task> {
        let _guard = self.lock();
        self.store.get(id)
    }

    /// Every task, ascending by id.
    pub fn list(&self) -> Result<Vec<Task>> {
        let _guard = self.lock();
        self.store.all()
    }

    /// Run the engine directly for a due date the caller already stored.
    pub fn propagate(
        &self,
        id: TaskId,
        old_due: NaiveDate,
        new_due: NaiveDate,
    ) -> Result<PropagationReport> {
        let _guard = self.lock();
        self.run_propagation(id, old_due, new_due)
    }

    /// All edges that currently break "dependent starts after prerequisite
    /// is due". Dangling references are skipped.
    pub fn unsettled_edges(&self) -> Result<Vec<UnsettledEdge>> {
        let tasks = {
            let _guard = self.lock();
            self.store.all()?
        };
        let graph = DependencyGraph::from_tasks(&tasks);
        let by_id: HashMap<TaskId, &Task> = tasks.iter().map(|t| (t.id, t)).collect();

        let mut edges = Vec::new();
        for (from, to) in graph.edges() {
            let (Some(prereq), Some(dependent)) = (by_id.get(&from), by_id.get(&to)) else {
                continue;
            };
            if dependent.start_date <= prereq.due_date {
                edges.push(UnsettledEdge {
                    prerequisite: from,
                    prerequisite_due: prereq.due_date,
                    dependent: to,
                    dependent_start: dependent.start_date,
                });
            }
        }
        Ok(edges)
    }

    fn run_propagation(
        &self,
        id: TaskId,
        old_due: NaiveDate,
        new_due: NaiveDate,
    ) -> Result<PropagationReport> {
        Propagator::new(&self.store, self.options).propagate(id, old_due, new_due)
    }

    fn validate_dependencies(&self, id: TaskId, deps: &[TaskId]) -> Result<()> {
        for dep in deps.iter().copied() {
            if dep == id {
                return Err(TrackerError::SelfDependency(id));
            }
            if !self.store.contains(dep)? {
                return Err(TrackerError::UnknownDependency {
                    task: Some(id),
                    dependency: dep,
                });
            }
        }
        Ok(())
    }
}
