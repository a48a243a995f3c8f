// src/config/mod.rs

//! Task file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load and save a task file (`loader.rs`).
//! - Validate ids, dependency references and acyclicity (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_tasks_path, load_and_validate, load_from_path, save_to_path};
pub use model::{ConfigSection, RawTaskFile, TaskEntry, TaskFile};
