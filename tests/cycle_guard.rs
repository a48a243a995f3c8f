// tests/cycle_guard.rs

use std::sync::Arc;

use taskshift::engine::PropagationOptions;
use taskshift::errors::TrackerError;
use taskshift::task::TaskPatch;
use taskshift::tracker::TaskTracker;
use taskshift::types::CycleBehaviour;
use taskshift_test_utils::builders::{StoreBuilder, TaskBuilder};
use taskshift_test_utils::recording_store::RecordingStore;
use taskshift_test_utils::{date, init_tracing, with_timeout};

/// A depends on B and B depends on A. Only reachable by seeding the store
/// directly; the tracker never lets such data in.
fn two_task_cycle() -> StoreBuilder {
    StoreBuilder::new()
        .with_task(TaskBuilder::new(1, "2024-01-01", "2024-01-05").after(2))
        .with_task(TaskBuilder::new(2, "2024-01-06", "2024-01-08").after(1))
}

#[tokio::test]
async fn two_task_cycle_reports_instead_of_hanging() {
    with_timeout(async {
        init_tracing();
        let tracker = Arc::new(TaskTracker::new(two_task_cycle().build()));

        let t = Arc::clone(&tracker);
        let result = tokio::task::spawn_blocking(move || {
            t.update(1, TaskPatch::due_date(date("2024-01-10")))
        })
        .await
        .expect("update thread panicked");

        match result {
            Err(TrackerError::CyclicDependency { tasks, report }) => {
                assert_eq!(tasks, vec![1, 2]);
                assert_eq!(report.changed_ids(), vec![2]);
            }
            Err(e) => panic!("Expected CyclicDependency, got: {:?}", e),
            Ok(o) => panic!("Expected error, got Ok({:?})", o),
        }

        // 2 moved once after the root; moving the root again to follow 2 was
        // refused, so the root keeps its requested due date.
        let root = tracker.get(1).unwrap();
        assert_eq!((root.start_date, root.due_date), (date("2024-01-01"), date("2024-01-10")));
        let dependent = tracker.get(2).unwrap();
        assert_eq!(
            (dependent.start_date, dependent.due_date),
            (date("2024-01-11"), date("2024-01-13"))
        );
    })
    .await
}

#[tokio::test]
async fn self_dependency_in_store_is_reported() {
    with_timeout(async {
        init_tracing();
        let store = StoreBuilder::new()
            .with_task(TaskBuilder::new(1, "2024-01-01", "2024-01-05").after(1))
            .build();
        let tracker = Arc::new(TaskTracker::new(store));

        let t = Arc::clone(&tracker);
        let result = tokio::task::spawn_blocking(move || {
            t.update(1, TaskPatch::due_date(date("2024-01-10")))
        })
        .await
        .expect("update thread panicked");

        assert!(matches!(
            result,
            Err(TrackerError::CyclicDependency { ref tasks, .. }) if tasks == &vec![1]
        ));
    })
    .await
}

#[test]
fn cycle_below_the_root_is_shifted_once_and_reported() {
    init_tracing();
    // 1 -> 2 enters the cycle 2 <-> 3.
    let store = StoreBuilder::new()
        .with_task(TaskBuilder::new(1, "2024-01-01", "2024-01-05"))
        .with_task(TaskBuilder::new(2, "2024-01-06", "2024-01-07").after(1).after(3))
        .with_task(TaskBuilder::new(3, "2024-01-08", "2024-01-09").after(2))
        .build();
    let tracker = TaskTracker::new(store);

    let err = tracker
        .update(1, TaskPatch::due_date(date("2024-01-10")))
        .expect_err("cycle must be reported");
    match err {
        TrackerError::CyclicDependency { tasks, report } => {
            assert_eq!(tasks, vec![2, 3]);
            assert_eq!(report.changed_ids(), vec![2, 3]);
        }
        other => panic!("Expected CyclicDependency, got: {:?}", other),
    }

    let entry = tracker.get(2).unwrap();
    assert_eq!((entry.start_date, entry.due_date), (date("2024-01-11"), date("2024-01-12")));
    let back = tracker.get(3).unwrap();
    assert_eq!((back.start_date, back.due_date), (date("2024-01-13"), date("2024-01-14")));

    // Only the edge that closes the cycle is left overlapping; the edge the
    // cascade entered through is settled.
    let unsettled: Vec<(u64, u64)> = tracker
        .unsettled_edges()
        .unwrap()
        .iter()
        .map(|e| (e.prerequisite, e.dependent))
        .collect();
    assert_eq!(unsettled, vec![(3, 2)]);
}

#[test]
fn sibling_branches_keep_their_shifts_when_a_cycle_is_hit() {
    init_tracing();
    // 1 -> 3 is a plain edge; 1 -> 2 leads into the cycle 2 <-> 4.
    let store = StoreBuilder::new()
        .with_task(TaskBuilder::new(1, "2024-01-01", "2024-01-05"))
        .with_task(TaskBuilder::new(2, "2024-01-06", "2024-01-07").after(1).after(4))
        .with_task(TaskBuilder::new(3, "2024-01-06", "2024-01-09").after(1))
        .with_task(TaskBuilder::new(4, "2024-01-08", "2024-01-09").after(2))
        .build();
    let recording = RecordingStore::new(store);
    let tracker = TaskTracker::new(recording.clone());

    let err = tracker
        .update(1, TaskPatch::due_date(date("2024-01-10")))
        .expect_err("cycle must be reported");

    match err {
        TrackerError::CyclicDependency { tasks, report } => {
            assert_eq!(tasks, vec![2, 4]);
            let mut changed = report.changed_ids();
            changed.sort_unstable();
            assert_eq!(changed, vec![2, 3, 4]);
        }
        other => panic!("Expected CyclicDependency, got: {:?}", other),
    }

    let sibling = tracker.get(3).unwrap();
    assert_eq!((sibling.start_date, sibling.due_date), (date("2024-01-11"), date("2024-01-14")));
    assert_eq!(tracker.get(2).unwrap().start_date, date("2024-01-11"));
    assert_eq!(tracker.get(4).unwrap().start_date, date("2024-01-13"));

    // Root first, then each dependent exactly once.
    let patched = recording.patched_ids();
    assert_eq!(patched[0], 1);
    let mut rest = patched[1..].to_vec();
    rest.sort_unstable();
    assert_eq!(rest, vec![2, 3, 4]);
}

#[test]
fn warn_mode_returns_the_cycle_in_the_report() {
    init_tracing();
    let options = PropagationOptions {
        on_cycle: CycleBehaviour::Warn,
        ..PropagationOptions::default()
    };
    let tracker = TaskTracker::with_options(two_task_cycle().build(), options);

    let outcome = tracker
        .update(1, TaskPatch::due_date(date("2024-01-10")))
        .expect("warn mode does not fail the update");

    let report = outcome.propagation.expect("cascade ran");
    assert_eq!(report.changed_ids(), vec![2]);
    assert_eq!(report.cycles, vec![1, 2]);
}

#[test]
fn cycle_that_nothing_needs_to_move_is_not_reported() {
    init_tracing();
    // 2 <-> 3 hang below 1, but 2 already starts well after 1's new due date.
    let store = StoreBuilder::new()
        .with_task(TaskBuilder::new(1, "2024-01-01", "2024-01-05"))
        .with_task(TaskBuilder::new(2, "2024-02-01", "2024-02-02").after(1).after(3))
        .with_task(TaskBuilder::new(3, "2024-02-03", "2024-02-04").after(2))
        .build();
    let tracker = TaskTracker::new(store);

    let outcome = tracker
        .update(1, TaskPatch::due_date(date("2024-01-15")))
        .expect("no task on the cycle has to move");
    assert!(outcome.propagation.is_some_and(|r| r.is_noop() && r.cycles.is_empty()));
}

#[test]
fn cascade_deeper_than_the_limit_is_aborted() {
    init_tracing();
    let store = StoreBuilder::new()
        .with_task(TaskBuilder::new(1, "2024-01-01", "2024-01-02"))
        .with_task(TaskBuilder::new(2, "2024-01-03", "2024-01-04").after(1))
        .with_task(TaskBuilder::new(3, "2024-01-05", "2024-01-06").after(2))
        .with_task(TaskBuilder::new(4, "2024-01-07", "2024-01-08").after(3))
        .build();
    let options = PropagationOptions {
        max_depth: Some(2),
        ..PropagationOptions::default()
    };
    let tracker = TaskTracker::with_options(store, options);

    let err = tracker
        .update(1, TaskPatch::due_date(date("2024-01-20")))
        .expect_err("depth 3 exceeds a limit of 2");
    assert!(matches!(err, TrackerError::CascadeTooDeep { root: 1, limit: 2 }));

    // Shifts decided before the limit was hit stay applied.
    assert_eq!(tracker.get(2).unwrap().start_date, date("2024-01-21"));
    assert_eq!(tracker.get(3).unwrap().start_date, date("2024-01-23"));
    assert_eq!(tracker.get(4).unwrap().start_date, date("2024-01-07"));
}
