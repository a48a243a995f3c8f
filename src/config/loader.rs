// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigSection, RawTaskFile, TaskFile};
use crate::errors::Result;
use crate::task::Task;

/// Load a task file from a given path and return the raw `RawTaskFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawTaskFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let file: RawTaskFile = toml::from_str(&contents)?;

    Ok(file)
}

/// Load a task file and validate it:
///
/// - ids are positive integers and unique,
/// - no self or unknown dependencies,
/// - the dependency graph is acyclic,
/// - `[config]` values are sane.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<TaskFile> {
    let raw = load_from_path(&path)?;
    let file = TaskFile::try_from(raw)?;
    debug!(
        path = %path.as_ref().display(),
        tasks = file.tasks().len(),
        "loaded task file"
    );
    Ok(file)
}

/// Write tasks back to a TOML task file, replacing its contents.
pub fn save_to_path(path: impl AsRef<Path>, config: &ConfigSection, tasks: &[Task]) -> Result<()> {
    let path = path.as_ref();
    let raw = TaskFile::to_raw(config, tasks);
    let contents = toml::to_string(&raw)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;

    debug!(path = %path.display(), tasks = tasks.len(), "saved task file");
    Ok(())
}

/// Default task file location: `Tasks.toml` in the current directory.
pub fn default_tasks_path() -> PathBuf {
    PathBuf::from("Tasks.toml")
}
