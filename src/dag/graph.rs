// src/dag/graph.rs

use std::collections::BTreeMap;

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;

use crate::task::{Task, TaskId};

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone, Default)]
struct DepNode {
    /// Direct prerequisites, exactly as listed on the task. May contain ids
    /// that are not (or no longer) in the graph.
    deps: Vec<TaskId>,
    /// Direct dependents: tasks present in the graph that list this one.
    dependents: Vec<TaskId>,
}

/// In-memory dependency graph keyed by task id.
///
/// Edge direction is prerequisite -> dependent. Both directions are kept so
/// that the store can answer "who depends on X" without scanning, which is
/// the direction the propagation engine walks.
///
/// Unlike a validated config, the graph accepts anything a store may hold:
/// dangling prerequisite ids are kept on the dependent but produce no edge,
/// and cycles are representable so that they can be reported.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<TaskId, DepNode>,
    /// Reverse index for ids that are listed as prerequisites but not (yet)
    /// in the graph, so a later `insert` can link them without a scan.
    waiting: BTreeMap<TaskId, Vec<TaskId>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a set of tasks.
    pub fn from_tasks<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        let mut graph = Self::new();

        // First pass: create nodes with their dependency lists.
        for task in tasks {
            graph.nodes.insert(
                task.id,
                DepNode {
                    deps: task.dependencies.clone(),
                    dependents: Vec::new(),
                },
            );
        }

        // Second pass: populate dependents based on deps.
        let edges: Vec<(TaskId, TaskId)> = graph
            .nodes
            .iter()
            .flat_map(|(id, node)| node.deps.iter().map(move |dep| (*dep, *id)))
            .collect();
        for (dep, id) in edges {
            graph.link(dep, id);
        }

        graph
    }

    /// Add a node, or replace the dependency list of an existing one.
    ///
    /// Nodes already in the graph that list `id` as a prerequisite are linked
    /// up as its dependents, so insertion order does not matter.
    pub fn insert(&mut self, id: TaskId, deps: &[TaskId]) {
        if self.nodes.contains_key(&id) {
            self.set_dependencies(id, deps);
            return;
        }

        let dependents = self.waiting.remove(&id).unwrap_or_default();
        self.nodes.insert(
            id,
            DepNode {
                deps: Vec::new(),
                dependents,
            },
        );
        self.set_dependencies(id, deps);
    }

    /// Replace the prerequisites of `id`, keeping the reverse index in sync.
    /// Unknown `id`s are ignored.
    pub fn set_dependencies(&mut self, id: TaskId, deps: &[TaskId]) {
        let old = match self.nodes.get_mut(&id) {
            Some(node) => std::mem::replace(&mut node.deps, deps.to_vec()),
            None => return,
        };

        for dep in old {
            self.unlink(dep, id);
        }
        for dep in deps.iter().copied() {
            self.link(dep, id);
        }
    }

    /// Remove a node.
    ///
    /// Its dependents keep listing it as a prerequisite (a dangling id); they
    /// simply stop being reachable through it.
    pub fn remove(&mut self, id: TaskId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };

        for dep in node.deps {
            self.unlink(dep, id);
        }

        let dangling: Vec<TaskId> = node.dependents.into_iter().filter(|d| *d != id).collect();
        if !dangling.is_empty() {
            self.waiting.insert(id, dangling);
        }
    }

    fn link(&mut self, dep: TaskId, id: TaskId) {
        let dependents = match self.nodes.get_mut(&dep) {
            Some(node) => &mut node.dependents,
            None => self.waiting.entry(dep).or_default(),
        };
        if !dependents.contains(&id) {
            dependents.push(id);
        }
    }

    fn unlink(&mut self, dep: TaskId, id: TaskId) {
        if let Some(node) = self.nodes.get_mut(&dep) {
            node.dependents.retain(|d| *d != id);
        } else if let Some(dependents) = self.waiting.get_mut(&dep) {
            dependents.retain(|d| *d != id);
            if dependents.is_empty() {
                self.waiting.remove(&dep);
            }
        }
    }

    /// Immediate dependents of a task.
    pub fn dependents_of(&self, id: TaskId) -> &[TaskId] {
        self.nodes
            .get(&id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Edges between nodes that are both present, prerequisite first.
    pub fn edges(&self) -> impl Iterator<Item = (TaskId, TaskId)> + '_ {
        self.nodes.iter().flat_map(|(id, node)| {
            node.dependents.iter().map(move |dependent| (*id, *dependent))
        })
    }

    fn to_graphmap(&self) -> DiGraphMap<TaskId, ()> {
        let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
        for id in self.nodes.keys() {
            graph.add_node(*id);
        }
        for (from, to) in self.edges() {
            graph.add_edge(from, to, ());
        }
        graph
    }

    /// Strongly connected components in topological order: every
    /// prerequisite's component comes before its dependents' components.
    ///
    /// Ids inside a component are sorted. On an acyclic graph every component
    /// is a single node.
    pub fn components_in_topological_order(&self) -> Vec<Vec<TaskId>> {
        let graph = self.to_graphmap();
        // tarjan_scc yields components in reverse topological order.
        let mut sccs = tarjan_scc(&graph);
        sccs.reverse();
        for scc in sccs.iter_mut() {
            scc.sort_unstable();
        }
        sccs
    }

    /// Whether the given component (as returned by
    /// [`components_in_topological_order`](Self::components_in_topological_order))
    /// contains a cycle.
    pub fn is_cyclic_component(&self, component: &[TaskId]) -> bool {
        match component {
            [] => false,
            [single] => self.dependents_of(*single).contains(single),
            _ => true,
        }
    }

    /// Members of the first dependency cycle found, sorted, if any.
    pub fn find_cycle(&self) -> Option<Vec<TaskId>> {
        self.components_in_topological_order()
            .into_iter()
            .find(|scc| self.is_cyclic_component(scc))
    }
}
