// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::engine::PropagationReport;
use crate::task::TaskId;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Task {0} cannot depend on itself")]
    SelfDependency(TaskId),

    /// `task` is the task being validated; `None` while it is still being
    /// created and has no id yet.
    #[error("Unknown dependency: task {dependency} does not exist")]
    UnknownDependency {
        task: Option<TaskId>,
        dependency: TaskId,
    },

    /// A propagation run reached a task that sits on a dependency cycle.
    ///
    /// `report` holds the shifts that were applied before and beside the
    /// cyclic branch; they are not rolled back.
    #[error("Cyclic dependency among tasks {tasks:?}")]
    CyclicDependency {
        tasks: Vec<TaskId>,
        report: PropagationReport,
    },

    #[error("Cascade from task {root} exceeded the depth limit of {limit}")]
    CascadeTooDeep { root: TaskId, limit: usize },

    #[error("Shifted dates of task {0} fall outside the supported calendar range")]
    DateOutOfRange(TaskId),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cycle detected in dependency graph: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// Failure reported by a store backend, passed through untouched.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TrackerError>;
