// src/dag/graph.rs

//! Task-set declaration and dependency-graph construction.
//!
//! A [`TaskSet`] is the caller-facing declaration: task key, dependency
//! keys, task handle. [`DepGraph::build`] validates the whole declaration
//! before any task executes and derives the adjacency information the
//! scheduler needs: the zero-dependency seed set, per-task remaining
//! dependency counts, and per-task dependents to notify on completion.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{Result, RundagError};
use crate::task::{ArcTask, TaskKey};

struct TaskSpec<T> {
    deps: Vec<TaskKey>,
    task: ArcTask<T>,
}

/// Named mapping of task key to (dependency keys, task).
pub struct TaskSet<T> {
    tasks: HashMap<TaskKey, TaskSpec<T>>,
}

impl<T> TaskSet<T> {
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Add a task under `key`, depending on `deps`.
    ///
    /// Inserting the same key twice replaces the earlier entry.
    pub fn insert(&mut self, key: impl Into<TaskKey>, deps: &[&str], task: ArcTask<T>) {
        let spec = TaskSpec {
            deps: deps.iter().map(|dep| dep.to_string()).collect(),
            task,
        };
        self.tasks.insert(key.into(), spec);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<T> Default for TaskSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal node structure: stores immediate deps and dependents.
struct GraphNode<T> {
    task: ArcTask<T>,
    deps: Vec<TaskKey>,
    dependents: Vec<TaskKey>,
}

/// Validated, read-only dependency graph, built once per pass.
///
/// Construction guarantees referential integrity (every dependency names a
/// task in the set) and acyclicity, so the scheduler can assume every task
/// eventually becomes ready on the all-success path.
pub struct DepGraph<T> {
    nodes: HashMap<TaskKey, GraphNode<T>>,
    seeds: Vec<TaskKey>,
}

impl<T> std::fmt::Debug for DepGraph<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepGraph")
            .field("nodes", &self.nodes.keys().collect::<Vec<_>>())
            .field("seeds", &self.seeds)
            .finish()
    }
}

impl<T> DepGraph<T> {
    /// Validate `set` and build the graph.
    ///
    /// Checks, in order:
    /// - every dependency key names a task in the set
    /// - no task depends on itself
    /// - the dependency relation is acyclic
    ///
    /// All checks run before any task executes; an empty set is valid.
    pub fn build(set: TaskSet<T>) -> Result<Self> {
        validate_references(&set)?;
        validate_acyclic(&set)?;

        // First pass: create nodes with their dependency lists.
        let mut nodes: HashMap<TaskKey, GraphNode<T>> = set
            .tasks
            .into_iter()
            .map(|(key, spec)| {
                (
                    key,
                    GraphNode {
                        task: spec.task,
                        deps: spec.deps,
                        dependents: Vec::new(),
                    },
                )
            })
            .collect();

        // Second pass: populate dependents from the dependency lists.
        let keys: Vec<TaskKey> = nodes.keys().cloned().collect();
        for key in &keys {
            let deps = nodes
                .get(key)
                .map(|node| node.deps.clone())
                .unwrap_or_default();

            for dep in deps {
                if let Some(dep_node) = nodes.get_mut(&dep) {
                    dep_node.dependents.push(key.clone());
                }
            }
        }

        let seeds: Vec<TaskKey> = keys
            .into_iter()
            .filter(|key| nodes.get(key).is_some_and(|node| node.deps.is_empty()))
            .collect();

        Ok(Self { nodes, seeds })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All task keys in the graph.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Tasks with no dependencies; these are ready the moment a pass starts.
    pub fn seeds(&self) -> &[TaskKey] {
        &self.seeds
    }

    /// Immediate dependencies of a task.
    pub fn dependencies_of(&self, key: &str) -> &[TaskKey] {
        self.nodes
            .get(key)
            .map(|node| node.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list it as a dependency).
    pub fn dependents_of(&self, key: &str) -> &[TaskKey] {
        self.nodes
            .get(key)
            .map(|node| node.dependents.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn task(&self, key: &str) -> Option<ArcTask<T>> {
        self.nodes.get(key).map(|node| node.task.clone())
    }
}

fn validate_references<T>(set: &TaskSet<T>) -> Result<()> {
    for (key, spec) in set.tasks.iter() {
        for dep in spec.deps.iter() {
            if dep == key {
                return Err(RundagError::SelfDependency { task: key.clone() });
            }
            if !set.tasks.contains_key(dep) {
                return Err(RundagError::UnresolvedDependency {
                    task: key.clone(),
                    dep: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_acyclic<T>(set: &TaskSet<T>) -> Result<()> {
    // Edge direction: dep -> task. A topological sort fails iff the
    // dependency relation has a cycle; we only need existence, not the
    // exact cycle.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for key in set.tasks.keys() {
        graph.add_node(key.as_str());
    }

    for (key, spec) in set.tasks.iter() {
        for dep in spec.deps.iter() {
            graph.add_edge(dep.as_str(), key.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(RundagError::Cycle(cycle.node_id().to_string())),
    }
}
