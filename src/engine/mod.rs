// src/engine/mod.rs

//! Dependency propagation engine.
//!
//! When a task's due date moves, every task that depends on it (directly or
//! transitively) and now overlaps it is pushed forward so that it starts the
//! day after its latest prerequisite is due, keeping its own length.
//!
//! - [`propagate`] holds the walk itself ([`Propagator`]).
//! - [`report`] describes what a run changed.
//! - [`dates`] has the calendar-day helpers.

pub mod dates;
pub mod propagate;
pub mod report;

pub use propagate::Propagator;
pub use report::{DateShift, PropagationReport};

use crate::types::CycleBehaviour;

/// Knobs for a propagation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropagationOptions {
    /// Maximum cascade depth before a run is aborted. `None` uses the number
    /// of tasks in the store, which no acyclic cascade can exceed.
    pub max_depth: Option<usize>,
    /// What to do when a cycle is reached.
    pub on_cycle: CycleBehaviour,
}
