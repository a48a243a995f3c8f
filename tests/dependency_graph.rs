// tests/dependency_graph.rs

use taskshift::dag::DependencyGraph;
use taskshift::store::{InMemoryTaskStore, TaskStore};
use taskshift_test_utils::builders::TaskBuilder;
use taskshift_test_utils::init_tracing;

#[test]
fn dependents_link_up_whatever_the_insertion_order() {
    init_tracing();
    let mut graph = DependencyGraph::new();

    // 3 arrives before both of its prerequisites.
    graph.insert(3, &[1, 2]);
    graph.insert(2, &[1]);
    graph.insert(1, &[]);

    assert_eq!(graph.dependents_of(1), &[3, 2]);
    assert_eq!(graph.dependents_of(2), &[3]);
    assert!(graph.dependents_of(3).is_empty());

    let mut edges: Vec<(u64, u64)> = graph.edges().collect();
    edges.sort_unstable();
    assert_eq!(edges, vec![(1, 2), (1, 3), (2, 3)]);
}

#[test]
fn dropped_and_removed_prerequisites_stop_linking() {
    init_tracing();
    let mut graph = DependencyGraph::new();
    graph.insert(3, &[1, 2]);

    // 3 no longer waits on 1, so a late 1 has no dependents.
    graph.set_dependencies(3, &[2]);
    graph.insert(1, &[]);
    assert!(graph.dependents_of(1).is_empty());

    graph.insert(2, &[]);
    assert_eq!(graph.dependents_of(2), &[3]);

    // 3 still lists 2 after it is removed; putting 2 back restores the edge.
    graph.remove(2);
    assert_eq!(graph.edges().count(), 0);
    graph.insert(2, &[]);
    assert_eq!(graph.dependents_of(2), &[3]);
}

#[test]
fn store_seeded_out_of_order_answers_dependents() {
    init_tracing();
    let tasks = (1..=200u64).rev().map(|id| {
        let builder = TaskBuilder::new(id, "2024-01-01", "2024-01-02");
        let builder = if id > 1 { builder.after(id - 1) } else { builder };
        builder.build()
    });
    let store = InMemoryTaskStore::with_tasks(tasks);

    for id in 1..200u64 {
        let dependents: Vec<u64> = store
            .query_dependents(id)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(dependents, vec![id + 1]);
    }
    assert!(store.query_dependents(200).unwrap().is_empty());
}
