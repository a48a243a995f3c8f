// src/engine/propagate.rs

//! The date propagation walk.
//!
//! A run has two phases:
//!
//! 1. **Discover.** Breadth-first over the reverse adjacency, starting at the
//!    root, collecting every reachable dependent into a private
//!    [`DependencyGraph`]. Each task id is read once; a visited set stops the
//!    walk from looping on malformed (cyclic) data.
//! 2. **Settle.** The discovered graph is split into strongly connected
//!    components and processed in topological order, so a task is evaluated
//!    once, after every prerequisite that could move in this run has reached
//!    its final date. A task is shifted only if a prerequisite that changed
//!    in this run (the root, or a task shifted earlier) violates its edge; its
//!    new start is the day after the latest violating prerequisite, over
//!    *all* of its prerequisites. Every task moves at most once per run. On a
//!    cycle the members are shifted once each as the walk reaches them; when
//!    the walk comes back around and asks a visited task (or the root) to
//!    move again, that shift is skipped and the cycle is reported.
//!
//! The run itself takes no lock; [`TaskTracker`](crate::tracker::TaskTracker)
//! serialises runs.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::dag::DependencyGraph;
use crate::engine::dates::{day_after, move_window};
use crate::engine::{DateShift, PropagationOptions, PropagationReport};
use crate::errors::{Result, TrackerError};
use crate::store::TaskStore;
use crate::task::{Task, TaskId, TaskPatch};
use crate::types::CycleBehaviour;

/// Tasks reachable from the root, plus the edges between them.
struct Discovered {
    tasks: BTreeMap<TaskId, Task>,
    graph: DependencyGraph,
}

/// Propagation engine bound to a store for the duration of one or more runs.
#[derive(Debug)]
pub struct Propagator<'a, S: TaskStore + ?Sized> {
    store: &'a S,
    options: PropagationOptions,
}

impl<'a, S: TaskStore + ?Sized> Propagator<'a, S> {
    pub fn new(store: &'a S, options: PropagationOptions) -> Self {
        Self { store, options }
    }

    /// Restore "dependent starts after prerequisite is due" downstream of
    /// `root`, whose due date just moved from `old_due` to `new_due`.
    ///
    /// The caller must already have stored `new_due` on `root`.
    ///
    /// Returns the applied shifts. Patches are written as they are decided;
    /// if the run fails part-way (store error, depth limit, or a cycle under
    /// [`CycleBehaviour::Error`]) the patches written so far stay in place.
    pub fn propagate(
        &self,
        root: TaskId,
        old_due: NaiveDate,
        new_due: NaiveDate,
    ) -> Result<PropagationReport> {
        let mut root_task = self.store.get(root)?;
        if root_task.due_date != new_due {
            warn!(
                task = root,
                stored = %root_task.due_date,
                requested = %new_due,
                "stored due date differs from the propagated one; using the propagated date"
            );
            root_task.due_date = new_due;
        }

        debug!(task = root, %old_due, %new_due, "starting propagation run");

        let Discovered { mut tasks, graph } = self.discover(root_task)?;
        let limit = self.depth_limit()?;
        let mut report = PropagationReport::new(root, old_due, new_due);

        // Tasks visited by this run (the root, or a task shifted in it),
        // mapped to their cascade depth. Each task moves at most once.
        let mut changed: HashMap<TaskId, usize> = HashMap::from([(root, 0)]);

        for component in graph.components_in_topological_order() {
            let mut pending: Vec<TaskId> = component
                .iter()
                .copied()
                .filter(|id| !changed.contains_key(id))
                .collect();

            // Inside a cycle a shift can trigger a member listed earlier, so
            // keep sweeping until a sweep moves nothing.
            loop {
                let before = pending.len();
                let mut unmoved = Vec::with_capacity(before);

                for id in pending {
                    let Some(task) = tasks.get(&id) else {
                        continue;
                    };
                    let triggers = violating_changed_prereqs(task, &tasks, &changed);
                    if triggers.is_empty() {
                        unmoved.push(id);
                        continue;
                    }

                    let depth = 1 + triggers
                        .iter()
                        .filter_map(|p| changed.get(p))
                        .max()
                        .copied()
                        .unwrap_or(0);
                    if depth > limit {
                        warn!(root, task = id, depth, limit, "cascade depth limit exceeded");
                        return Err(TrackerError::CascadeTooDeep { root, limit });
                    }

                    let shift = self.plan_shift(task, depth, &tasks)?;
                    self.store
                        .apply_patch(id, &TaskPatch::dates(shift.new_start, shift.new_due))?;

                    debug!(
                        task = id,
                        from = %shift.old_start,
                        to = %shift.new_start,
                        due = %shift.new_due,
                        depth,
                        "shifted dependent"
                    );

                    if let Some(task) = tasks.get_mut(&id) {
                        task.start_date = shift.new_start;
                        task.due_date = shift.new_due;
                    }
                    changed.insert(id, depth);
                    report.shifts.push(shift);
                }

                pending = unmoved;
                if pending.len() == before {
                    break;
                }
            }

            if !graph.is_cyclic_component(&component) {
                continue;
            }

            // A member that already moved (or the root) would have to move a
            // second time: the walk has come back around the cycle.
            let revisited: Vec<TaskId> = component
                .iter()
                .copied()
                .filter(|id| changed.contains_key(id))
                .filter(|id| {
                    tasks
                        .get(id)
                        .is_some_and(|t| !violating_changed_prereqs(t, &tasks, &changed).is_empty())
                })
                .collect();

            if !revisited.is_empty() {
                warn!(
                    root,
                    tasks = ?component,
                    ?revisited,
                    "dependency cycle reached during propagation; not shifting again"
                );
                report.cycles.extend(component.iter().copied());
            }
        }

        info!(
            root,
            shifted = report.shifts.len(),
            discovered = tasks.len() - 1,
            "propagation run settled"
        );

        if !report.cycles.is_empty() && self.options.on_cycle == CycleBehaviour::Error {
            return Err(TrackerError::CyclicDependency {
                tasks: report.cycles.clone(),
                report,
            });
        }

        Ok(report)
    }

    /// Collect everything reachable from `root` through dependents.
    fn discover(&self, root: Task) -> Result<Discovered> {
        let mut graph = DependencyGraph::new();
        graph.insert(root.id, &root.dependencies);

        let mut queue: VecDeque<TaskId> = VecDeque::from([root.id]);
        let mut visited: HashSet<TaskId> = HashSet::from([root.id]);
        let mut tasks: BTreeMap<TaskId, Task> = BTreeMap::new();
        tasks.insert(root.id, root);

        while let Some(id) = queue.pop_front() {
            for dependent in self.store.query_dependents(id)? {
                if !visited.insert(dependent.id) {
                    // Already collected; its edges are in the graph.
                    continue;
                }
                graph.insert(dependent.id, &dependent.dependencies);
                queue.push_back(dependent.id);
                tasks.insert(dependent.id, dependent);
            }
        }

        Ok(Discovered { tasks, graph })
    }

    fn depth_limit(&self) -> Result<usize> {
        match self.options.max_depth {
            Some(limit) => Ok(limit),
            None => Ok(self.store.count()?.max(1)),
        }
    }

    /// Work out where `task` has to move: the day after the latest due date
    /// among all of its prerequisites that it currently overlaps.
    fn plan_shift(
        &self,
        task: &Task,
        depth: usize,
        discovered: &BTreeMap<TaskId, Task>,
    ) -> Result<DateShift> {
        let mut latest: Option<NaiveDate> = None;

        for prereq in task.dependencies.iter().copied() {
            let due = match discovered.get(&prereq) {
                Some(p) => p.due_date,
                None => match self.store.get(prereq) {
                    Ok(p) => p.due_date,
                    Err(TrackerError::NotFound(_)) => {
                        warn!(task = task.id, prereq, "ignoring dangling dependency");
                        continue;
                    }
                    Err(e) => return Err(e),
                },
            };

            if due >= task.start_date && latest.is_none_or(|l| due > l) {
                latest = Some(due);
            }
        }

        let new_start = latest
            .and_then(day_after)
            .ok_or(TrackerError::DateOutOfRange(task.id))?;
        let (new_start, new_due) = move_window(task.start_date, task.due_date, new_start)
            .ok_or(TrackerError::DateOutOfRange(task.id))?;

        Ok(DateShift {
            task: task.id,
            old_start: task.start_date,
            old_due: task.due_date,
            new_start,
            new_due,
            depth,
        })
    }
}

/// Prerequisites of `task` that moved in this run and now end on or after
/// its start.
fn violating_changed_prereqs(
    task: &Task,
    discovered: &BTreeMap<TaskId, Task>,
    changed: &HashMap<TaskId, usize>,
) -> Vec<TaskId> {
    task.dependencies
        .iter()
        .copied()
        .filter(|p| changed.contains_key(p))
        .filter(|p| {
            discovered
                .get(p)
                .is_some_and(|prereq| prereq.due_date >= task.start_date)
        })
        .collect()
}
