// src/dag/scheduler.rs

//! One scheduling pass over a validated dependency graph.
//!
//! The scheduler is an event loop: it dispatches every ready task as a
//! worker, then consumes worker reports from a single channel. The loop is
//! the only code that touches the pass state (result store, dependency
//! counters, task states), so no locking exists anywhere in the pass;
//! workers communicate exclusively through their one completion report.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

use crate::dag::graph::DepGraph;
use crate::errors::{Errors, TaskError};
use crate::exec::worker::{spawn_worker, WorkerReport};
use crate::exec::Concurrency;
use crate::results::KeyedResults;
use crate::task::{TaskInput, TaskKey};

/// Per-pass state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    /// Waiting on at least one dependency.
    Waiting,
    /// Last outstanding dependency succeeded; dispatch is imminent.
    Ready,
    /// Handed to a worker and currently running.
    Running,
    /// Completed successfully; outputs are in the store.
    Succeeded,
    /// Reported an error.
    Failed,
    /// Released without execution because the pass failed first.
    Skipped,
}

/// Drives one pass over a [`DepGraph`].
///
/// Tasks with no dependencies start immediately; every other task starts
/// the moment its last dependency has published its outputs. Independent
/// tasks run concurrently. The first failure stops all further dispatch;
/// tasks already running are left to finish and drain.
pub struct Scheduler<T> {
    graph: DepGraph<T>,
    limit: Concurrency,
}

impl<T> Scheduler<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(graph: DepGraph<T>) -> Self {
        Self {
            graph,
            limit: Concurrency::Unbounded,
        }
    }

    /// Bound how many ready tasks may run simultaneously.
    ///
    /// The default is [`Concurrency::Unbounded`], which matches the
    /// historical behavior of this mode: readiness is the only throttle.
    pub fn with_concurrency(mut self, limit: Concurrency) -> Self {
        self.limit = limit;
        self
    }

    /// Execute one pass, returning the keyed results of every task that
    /// completed successfully and any failures encountered (`None` means
    /// the pass succeeded in full).
    pub async fn run(self) -> (KeyedResults<T>, Option<Errors>) {
        let total = self.graph.len();

        if total == 0 {
            debug!("empty task set; pass completes immediately");
            return (KeyedResults::new(), None);
        }

        info!(total, "starting dependency-graph pass");

        // Buffered to the task count so a worker can always deliver its
        // report, even when the pass has already failed and nobody acts on
        // the outcome anymore.
        let (report_tx, mut report_rx) = mpsc::channel(total);

        let mut pass = Pass {
            graph: &self.graph,
            states: self
                .graph
                .tasks()
                .map(|key| (key.to_string(), RunState::Waiting))
                .collect(),
            remaining: self
                .graph
                .tasks()
                .map(|key| (key.to_string(), self.graph.dependencies_of(key).len()))
                .collect(),
            results: KeyedResults::new(),
            errors: Errors::new(),
            running: 0,
            failed: false,
            report_tx,
            admission: self.limit.admission(),
        };

        for key in self.graph.seeds().to_vec() {
            pass.release(&key);
        }

        while pass.running > 0 {
            let Some(report) = report_rx.recv().await else {
                break;
            };
            pass.running -= 1;

            match report.outcome {
                Ok(values) => pass.on_success(report.id, values),
                Err(err) => pass.on_failure(report.id, err),
            }
        }

        info!(
            completed = pass.results.len(),
            failures = pass.errors.len(),
            "dependency-graph pass finished"
        );

        (pass.results, pass.errors.into_option())
    }
}

/// Mutable state of one pass, owned by the scheduler's event loop.
struct Pass<'g, T> {
    graph: &'g DepGraph<T>,
    states: HashMap<TaskKey, RunState>,
    /// Unresolved-dependency count per task; a task is released when its
    /// count reaches zero.
    remaining: HashMap<TaskKey, usize>,
    results: KeyedResults<T>,
    errors: Errors,
    running: usize,
    failed: bool,
    report_tx: mpsc::Sender<WorkerReport<TaskKey, T>>,
    admission: Option<Arc<Semaphore>>,
}

impl<T> Pass<'_, T>
where
    T: Clone + Send + 'static,
{
    /// Transition a task to `Ready` and dispatch it.
    fn release(&mut self, key: &TaskKey) {
        debug!(task = %key, "dependencies satisfied; task ready");
        self.states.insert(key.clone(), RunState::Ready);
        self.dispatch(key);
    }

    fn dispatch(&mut self, key: &TaskKey) {
        let Some(task) = self.graph.task(key) else {
            // Graph construction guarantees presence.
            warn!(task = %key, "task missing from graph; not dispatching");
            return;
        };

        let input = self.dependency_input(key);
        self.states.insert(key.clone(), RunState::Running);
        self.running += 1;

        debug!(task = %key, "dispatching task");
        spawn_worker(
            key.clone(),
            task,
            input,
            self.report_tx.clone(),
            self.admission.clone(),
        );
    }

    /// Build the input for `key`: the published outputs of each declared
    /// dependency, cloned out of the store before the task starts.
    fn dependency_input(&self, key: &str) -> TaskInput<T> {
        let deps = self.graph.dependencies_of(key);
        if deps.is_empty() {
            return TaskInput::Empty;
        }

        let mut outputs = HashMap::with_capacity(deps.len());
        for dep in deps {
            let values = self
                .results
                .get(dep)
                .map(|values| values.to_vec())
                .unwrap_or_default();
            outputs.insert(dep.clone(), values);
        }
        TaskInput::Deps(outputs)
    }

    fn on_success(&mut self, key: TaskKey, values: Vec<T>) {
        self.states.insert(key.clone(), RunState::Succeeded);

        if self.failed {
            // The pass state is terminal: no further store writes, no
            // further releases. The late result is dropped.
            debug!(task = %key, "task finished after pass failure; discarding result");
            return;
        }

        debug!(task = %key, outputs = values.len(), "task completed; publishing result");
        self.results.insert(key.clone(), values);

        let graph = self.graph;
        for dependent in graph.dependents_of(&key) {
            let Some(count) = self.remaining.get_mut(dependent) else {
                continue;
            };
            *count -= 1;
            if *count == 0 {
                self.release(dependent);
            }
        }
    }

    fn on_failure(&mut self, key: TaskKey, err: TaskError) {
        self.states.insert(key.clone(), RunState::Failed);
        warn!(task = %key, error = %err, "task failed");
        self.errors.push(err);

        if self.failed {
            // A straggler from before the first failure; its error is
            // collected, nothing else changes.
            return;
        }
        self.failed = true;

        // Release every task not yet dispatched, without executing it, so
        // the pass can end as soon as the running workers drain.
        let mut skipped = Vec::new();
        for (task, state) in self.states.iter_mut() {
            if matches!(state, RunState::Waiting | RunState::Ready) {
                *state = RunState::Skipped;
                skipped.push(task.clone());
            }
        }
        if !skipped.is_empty() {
            warn!(?skipped, "pass failed; releasing unstarted tasks without execution");
        }
    }
}
