#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use taskshift::store::InMemoryTaskStore;
use taskshift::task::{NewTask, Task, TaskId};
use taskshift::types::{Priority, Status};

use crate::date;

/// Builder for a stored `Task` with a fixed id, for seeding stores directly
/// (bypassing the tracker's validation, e.g. to plant cycles).
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    /// `start` and `due` are `YYYY-MM-DD` literals.
    pub fn new(id: TaskId, start: &str, due: &str) -> Self {
        Self {
            task: Task {
                id,
                title: format!("task {id}"),
                description: String::new(),
                start_date: date(start),
                due_date: date(due),
                priority: Priority::Medium,
                status: Status::Todo,
                dependencies: vec![],
                created_at: fixed_created_at(),
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.task.title = title.to_string();
        self
    }

    pub fn after(mut self, dep: TaskId) -> Self {
        self.task.dependencies.push(dep);
        self
    }

    pub fn status(mut self, status: Status) -> Self {
        self.task.status = status;
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

/// Builder for an `InMemoryTaskStore` seeded with explicit tasks.
#[derive(Default)]
pub struct StoreBuilder {
    tasks: Vec<Task>,
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, task: TaskBuilder) -> Self {
        self.tasks.push(task.build());
        self
    }

    pub fn build(self) -> InMemoryTaskStore {
        InMemoryTaskStore::with_tasks(self.tasks)
    }
}

/// Builder for `NewTask`, the input to `TaskTracker::create`.
pub struct NewTaskBuilder {
    task: NewTask,
}

impl NewTaskBuilder {
    pub fn new(title: &str, start: &str, due: &str) -> Self {
        Self {
            task: NewTask::new(title, date(start), date(due)),
        }
    }

    pub fn after(mut self, dep: TaskId) -> Self {
        self.task.dependencies.push(dep);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.task.priority = priority;
        self
    }

    pub fn build(self) -> NewTask {
        self.task
    }
}

fn fixed_created_at() -> DateTime<Utc> {
    date("2024-01-01")
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

/// Duration of a task in days.
pub fn length_days(start: NaiveDate, due: NaiveDate) -> i64 {
    due.signed_duration_since(start).num_days()
}
