// src/engine/report.rs

//! Result types of a propagation run.

use chrono::NaiveDate;

use crate::engine::dates::span;
use crate::task::TaskId;

/// One date patch written by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateShift {
    pub task: TaskId,
    pub old_start: NaiveDate,
    pub old_due: NaiveDate,
    pub new_start: NaiveDate,
    pub new_due: NaiveDate,
    /// Number of edges between the run's root and this task along the
    /// chain of shifts that reached it.
    pub depth: usize,
}

impl DateShift {
    /// How many days the task moved forward.
    pub fn days(&self) -> i64 {
        span(self.old_start, self.new_start).num_days()
    }
}

/// Everything a single propagation run did.
///
/// Hosts use [`changed_ids`](Self::changed_ids) to decide what to refresh;
/// the engine itself never notifies anybody.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropagationReport {
    /// The task whose due date changed.
    pub root: TaskId,
    pub old_due: NaiveDate,
    pub new_due: NaiveDate,
    /// Applied shifts, in the order they were written.
    pub shifts: Vec<DateShift>,
    /// Members of dependency cycles the run ran into. Those tasks were left
    /// untouched.
    pub cycles: Vec<TaskId>,
}

impl PropagationReport {
    pub fn new(root: TaskId, old_due: NaiveDate, new_due: NaiveDate) -> Self {
        Self {
            root,
            old_due,
            new_due,
            shifts: Vec::new(),
            cycles: Vec::new(),
        }
    }

    /// Ids of tasks the run patched, in write order. The root is not
    /// included; its due date was written by the caller.
    pub fn changed_ids(&self) -> Vec<TaskId> {
        self.shifts.iter().map(|s| s.task).collect()
    }

    /// `true` when the run wrote nothing.
    pub fn is_noop(&self) -> bool {
        self.shifts.is_empty()
    }

    pub fn shift_for(&self, task: TaskId) -> Option<&DateShift> {
        self.shifts.iter().find(|s| s.task == task)
    }
}
