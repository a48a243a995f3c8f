// src/config/validate.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;

use crate::config::model::{RawTaskFile, TaskEntry, TaskFile};
use crate::dag::DependencyGraph;
use crate::errors::{Result, TrackerError};
use crate::task::{Task, TaskId};

impl TryFrom<RawTaskFile> for TaskFile {
    type Error = TrackerError;

    fn try_from(raw: RawTaskFile) -> std::result::Result<Self, Self::Error> {
        ensure_has_tasks(&raw)?;
        validate_global_config(&raw)?;
        let tasks = parse_tasks(raw.task)?;
        validate_task_dependencies(&tasks)?;
        validate_dag(&tasks)?;
        Ok(TaskFile::new_unchecked(raw.config, tasks))
    }
}

fn ensure_has_tasks(file: &RawTaskFile) -> Result<()> {
    if file.task.is_empty() {
        return Err(TrackerError::ConfigError(
            "task file must contain at least one [task.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(file: &RawTaskFile) -> Result<()> {
    if file.config.max_cascade_depth == Some(0) {
        return Err(TrackerError::ConfigError(
            "[config].max_cascade_depth must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn parse_tasks(entries: BTreeMap<String, TaskEntry>) -> Result<Vec<Task>> {
    let loaded_at = Utc::now();
    let mut tasks = Vec::with_capacity(entries.len());

    for (key, entry) in entries {
        let id: TaskId = match key.trim().parse() {
            Ok(id) if id > 0 => id,
            _ => {
                return Err(TrackerError::ConfigError(format!(
                    "task key '{key}' is not a positive integer id"
                )));
            }
        };

        tasks.push(Task {
            id,
            title: entry.title,
            description: entry.description,
            start_date: entry.start_date,
            due_date: entry.due_date,
            priority: entry.priority,
            status: entry.status,
            dependencies: entry.dependencies,
            created_at: entry.created_at.unwrap_or(loaded_at),
        });
    }

    // Keys like "01" and "1" parse to the same id.
    let mut seen = BTreeSet::new();
    for task in &tasks {
        if !seen.insert(task.id) {
            return Err(TrackerError::ConfigError(format!(
                "task id {} is defined more than once",
                task.id
            )));
        }
    }

    tasks.sort_by_key(|t| t.id);
    Ok(tasks)
}

fn validate_task_dependencies(tasks: &[Task]) -> Result<()> {
    let ids: BTreeSet<TaskId> = tasks.iter().map(|t| t.id).collect();

    for task in tasks {
        for dep in task.dependencies.iter() {
            if *dep == task.id {
                return Err(TrackerError::ConfigError(format!(
                    "task {} cannot depend on itself",
                    task.id
                )));
            }
            if !ids.contains(dep) {
                return Err(TrackerError::ConfigError(format!(
                    "task {} has unknown dependency {}",
                    task.id, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(tasks: &[Task]) -> Result<()> {
    let graph = DependencyGraph::from_tasks(tasks);

    match graph.find_cycle() {
        None => Ok(()),
        Some(cycle) => Err(TrackerError::DagCycle(format!(
            "cycle detected in task graph involving tasks {:?}",
            cycle
        ))),
    }
}
