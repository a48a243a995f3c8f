// src/types.rs

//! Small enums shared by the task model, the config file and the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Task priority. Carried through the store untouched; the engine ignores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        f.write_str(s)
    }
}

/// Workflow status of a task.
///
/// Done tasks are shifted like any other: the engine only looks at dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Done => "done",
        };
        f.write_str(s)
    }
}

/// What a propagation run does when it runs into a dependency cycle.
///
/// In both cases a task on the cycle is shifted at most once and the shift
/// that would move it a second time is skipped.
///
/// - `Error`: the caller receives
///   [`TrackerError::CyclicDependency`](crate::errors::TrackerError)
///   (default behaviour).
/// - `Warn`: the run returns `Ok` and the cycle members are listed in the
///   report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleBehaviour {
    #[default]
    Error,
    Warn,
}

