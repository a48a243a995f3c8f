// tests/propagation_properties.rs

use std::collections::{BTreeMap, HashSet};

use chrono::Days;
use proptest::prelude::*;
use taskshift::store::InMemoryTaskStore;
use taskshift::task::{Task, TaskId, TaskPatch};
use taskshift::tracker::TaskTracker;
use taskshift_test_utils::builders::{TaskBuilder, length_days};
use taskshift_test_utils::date;

/// (start offset, length, raw deps) per task.
type RawTask = (u64, u64, Vec<usize>);

// Acyclic by construction: task i may only depend on tasks 0..i.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Task>> {
    (1..=max_tasks).prop_flat_map(|n| {
        proptest::collection::vec(
            (0..60u64, 0..10u64, proptest::collection::vec(any::<usize>(), 0..3)),
            n,
        )
        .prop_map(build_tasks)
    })
}

fn build_tasks(raw: Vec<RawTask>) -> Vec<Task> {
    let base = date("2024-01-01");
    raw.into_iter()
        .enumerate()
        .map(|(i, (offset, len, deps))| {
            let start = base.checked_add_days(Days::new(offset)).unwrap();
            let due = start.checked_add_days(Days::new(len)).unwrap();
            let id = i as TaskId + 1;
            let mut builder =
                TaskBuilder::new(id, &start.to_string(), &due.to_string());
            let unique: HashSet<usize> = deps.into_iter().filter(|_| i > 0).map(|d| d % i).collect();
            for dep in unique {
                builder = builder.after(dep as TaskId + 1);
            }
            builder.build()
        })
        .collect()
}

proptest! {
    #[test]
    fn cascade_restores_touched_edges_and_keeps_lengths(
        tasks in dag_strategy(12),
        root_pick in any::<usize>(),
        push in 1..40u64,
    ) {
        let before: BTreeMap<TaskId, Task> = tasks.iter().map(|t| (t.id, t.clone())).collect();
        let root = (root_pick % tasks.len()) as TaskId + 1;
        let old_due = before[&root].due_date;
        let new_due = old_due.checked_add_days(Days::new(push)).unwrap();

        let tracker = TaskTracker::new(InMemoryTaskStore::with_tasks(tasks));
        let outcome = tracker.update(root, TaskPatch::due_date(new_due)).unwrap();
        prop_assert!(outcome.propagation.is_some());
        let after: BTreeMap<TaskId, Task> =
            tracker.list().unwrap().into_iter().map(|t| (t.id, t)).collect();

        let shifted: Vec<TaskId> = outcome.shifted_ids();
        let shifted_set: HashSet<TaskId> = shifted.iter().copied().collect();
        prop_assert_eq!(shifted.len(), shifted_set.len(), "a task was shifted twice");

        // Every edge leaving a moved task is settled.
        let mut moved = shifted_set.clone();
        moved.insert(root);
        for task in after.values() {
            for prereq in &task.dependencies {
                if moved.contains(prereq) {
                    prop_assert!(
                        task.start_date > after[prereq].due_date,
                        "task {} starts {} but prerequisite {} is due {}",
                        task.id, task.start_date, prereq, after[prereq].due_date
                    );
                }
            }
        }

        for (id, old) in &before {
            let new = &after[id];
            if shifted_set.contains(id) {
                prop_assert!(new.start_date > old.start_date);
                prop_assert_eq!(
                    length_days(old.start_date, old.due_date),
                    length_days(new.start_date, new.due_date)
                );
            } else if *id != root {
                prop_assert_eq!((old.start_date, old.due_date), (new.start_date, new.due_date));
            }
        }

        // Running the same propagation again is a no-op.
        let again = tracker.propagate(root, old_due, new_due).unwrap();
        prop_assert!(again.is_noop());
    }

    #[test]
    fn unchanged_due_date_leaves_existing_overlaps_alone(
        tasks in dag_strategy(12),
        root_pick in any::<usize>(),
    ) {
        let before = tasks.clone();
        let root = (root_pick % tasks.len()) as TaskId + 1;
        let due = before[root as usize - 1].due_date;

        let tracker = TaskTracker::new(InMemoryTaskStore::with_tasks(tasks));
        let outcome = tracker.update(root, TaskPatch::due_date(due)).unwrap();

        prop_assert!(outcome.propagation.is_none());
        prop_assert_eq!(tracker.list().unwrap(), before);
    }
}
