// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod store;
pub mod task;
pub mod tracker;
pub mod types;

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::cli::{CliArgs, Command, DueDateArg};
use crate::config::{TaskFile, load_and_validate, save_to_path};
use crate::store::InMemoryTaskStore;
use crate::task::{Task, TaskId, TaskPatch};
use crate::tracker::TaskTracker;

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the task file, seeds an in-memory store from it, and
/// runs the requested command through a [`TaskTracker`].
pub fn run(args: CliArgs) -> Result<()> {
    let path = args.tasks;
    let file = load_and_validate(&path)
        .with_context(|| format!("loading task file {}", path.display()))?;

    let config = file.config.clone();
    let tracker = tracker_from_file(file);

    match args.command {
        Command::Check => print_check(&tracker)?,
        Command::List => print_tasks(&tracker.list()?),
        Command::SetDue { id, due, write } => {
            set_due(&tracker, id, due)?;
            if write {
                save_to_path(&path, &config, &tracker.list()?)?;
                println!("saved {}", path.display());
            }
        }
        Command::Similar { title } => {
            let matches = tracker.find_similar(&title)?;
            println!("similar to {title:?} ({}):", matches.len());
            print_tasks(&matches);
        }
    }

    Ok(())
}

/// Build a tracker over an in-memory copy of the file's tasks.
pub fn tracker_from_file(file: TaskFile) -> TaskTracker<InMemoryTaskStore> {
    let options = file.config.propagation_options();
    TaskTracker::with_options(file.into_store(), options)
}

fn set_due(tracker: &TaskTracker<InMemoryTaskStore>, id: TaskId, due: DueDateArg) -> Result<()> {
    let current = tracker.get(id)?;
    let new_due = due
        .resolve(current.due_date)
        .ok_or_else(|| anyhow!("due date for task {id} out of range"))?;

    let outcome = tracker.update(id, TaskPatch::due_date(new_due))?;
    println!(
        "task {id}: due {} -> {}",
        current.due_date, outcome.task.due_date
    );

    match outcome.propagation {
        None => println!("  due date unchanged; nothing to propagate"),
        Some(report) if report.is_noop() => println!("  no dependents needed to move"),
        Some(report) => {
            println!("  shifted {} dependent(s):", report.shifts.len());
            for shift in &report.shifts {
                println!(
                    "    - task {}: {}..{} -> {}..{} (+{}d)",
                    shift.task,
                    shift.old_start,
                    shift.old_due,
                    shift.new_start,
                    shift.new_due,
                    shift.days()
                );
            }
        }
    }

    Ok(())
}

fn print_check(tracker: &TaskTracker<InMemoryTaskStore>) -> Result<()> {
    let tasks = tracker.list()?;
    let unsettled = tracker.unsettled_edges()?;

    println!("tasks: {}", tasks.len());
    if unsettled.is_empty() {
        println!("all dependency edges settled");
    } else {
        println!("unsettled edges ({}):", unsettled.len());
        for edge in unsettled {
            println!(
                "  - task {} (start {}) starts before task {} is done (due {})",
                edge.dependent, edge.dependent_start, edge.prerequisite, edge.prerequisite_due
            );
        }
    }

    debug!("check complete (no changes)");
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    for task in tasks {
        println!("  - [{}] {}", task.id, task.title);
        println!(
            "      {} -> {}  priority: {}  status: {}",
            task.start_date, task.due_date, task.priority, task.status
        );
        if !task.dependencies.is_empty() {
            println!("      after: {:?}", task.dependencies);
        }
    }
}
