// src/exec/dispatcher.rs

//! Batch fan-out over a fixed set of tasks.
//!
//! All modes here share the same shape: spawn one worker per task through
//! [`spawn_worker`], then collect reports from a channel buffered to the
//! batch size. They differ only in admission (bounded or not) and in when
//! collection stops (race stops at the first report).

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, warn};

use crate::errors::{Errors, Result, RundagError};
use crate::exec::worker::{spawn_worker, WorkerReport};
use crate::results::{IndexedResults, KeyedResults};
use crate::task::{ArcTask, TaskInput, TaskKey};

/// How many tasks of a batch may run simultaneously.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// Launch every task immediately.
    Unbounded,
    /// Admit at most this many tasks at once; the bound is always >= 1.
    Bounded(usize),
}

impl Concurrency {
    /// Bound by `limit`, with `0` meaning unbounded.
    pub fn bounded(limit: usize) -> Self {
        if limit == 0 {
            Concurrency::Unbounded
        } else {
            Concurrency::Bounded(limit)
        }
    }

    /// Bound by the host's available parallelism.
    pub fn available() -> Self {
        let limit = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Concurrency::Bounded(limit)
    }

    pub(crate) fn admission(self) -> Option<Arc<Semaphore>> {
        match self {
            Concurrency::Unbounded => None,
            Concurrency::Bounded(limit) => Some(Arc::new(Semaphore::new(limit.max(1)))),
        }
    }
}

/// Run an ordered batch of tasks, collecting each task's outputs under its
/// submission position.
///
/// Returns once every task has reported. Failures do not short-circuit the
/// batch; they accumulate into the aggregate while the rest of the batch
/// keeps running. `None` errors means every task succeeded.
pub async fn run_batch<T>(
    tasks: Vec<ArcTask<T>>,
    limit: Concurrency,
) -> (IndexedResults<T>, Option<Errors>)
where
    T: Send + 'static,
{
    let total = tasks.len();
    let mut results = IndexedResults::with_slots(total);
    let mut errors = Errors::new();

    if total == 0 {
        return (results, None);
    }

    debug!(total, ?limit, "dispatching ordered batch");

    let (report_tx, mut report_rx) = mpsc::channel(total);
    let admission = limit.admission();

    for (index, task) in tasks.into_iter().enumerate() {
        spawn_worker(index, task, TaskInput::Empty, report_tx.clone(), admission.clone());
    }
    drop(report_tx);

    while let Some(report) = report_rx.recv().await {
        match report.outcome {
            Ok(values) => results.insert(report.id, values),
            Err(err) => {
                warn!(index = report.id, error = %err, "batch task failed");
                errors.push(err);
            }
        }
    }

    debug!(completed = results.len(), failures = errors.len(), "ordered batch finished");
    (results, errors.into_option())
}

/// Run a named batch of tasks, collecting each task's outputs under its
/// key. Semantics are identical to [`run_batch`] otherwise.
pub async fn run_batch_keyed<T>(
    tasks: Vec<(TaskKey, ArcTask<T>)>,
    limit: Concurrency,
) -> (KeyedResults<T>, Option<Errors>)
where
    T: Send + 'static,
{
    let total = tasks.len();
    let mut results = KeyedResults::new();
    let mut errors = Errors::new();

    if total == 0 {
        return (results, None);
    }

    debug!(total, ?limit, "dispatching named batch");

    let (report_tx, mut report_rx) = mpsc::channel(total);
    let admission = limit.admission();

    for (key, task) in tasks {
        spawn_worker(key, task, TaskInput::Empty, report_tx.clone(), admission.clone());
    }
    drop(report_tx);

    while let Some(report) = report_rx.recv().await {
        match report.outcome {
            Ok(values) => results.insert(report.id, values),
            Err(err) => {
                warn!(task = %report.id, error = %err, "batch task failed");
                errors.push(err);
            }
        }
    }

    debug!(completed = results.len(), failures = errors.len(), "named batch finished");
    (results, errors.into_option())
}

/// Run every task concurrently and return the first outcome, success or
/// failure.
///
/// The remaining tasks are not cancelled; they run to completion in the
/// background and their reports are dropped when the channel closes.
pub async fn race<T>(tasks: Vec<ArcTask<T>>) -> Result<Vec<T>>
where
    T: Send + 'static,
{
    if tasks.is_empty() {
        return Err(RundagError::EmptyRace);
    }

    let total = tasks.len();
    let (report_tx, mut report_rx) = mpsc::channel(total);

    for (index, task) in tasks.into_iter().enumerate() {
        spawn_worker(index, task, TaskInput::Empty, report_tx.clone(), None);
    }
    drop(report_tx);

    match report_rx.recv().await {
        Some(report) => {
            debug!(index = report.id, won = report.outcome.is_ok(), "race decided by first report");
            report.outcome.map_err(RundagError::Task)
        }
        // Unreachable for a non-empty batch: every worker reports exactly
        // once and the channel buffers the full batch.
        None => Err(RundagError::EmptyRace),
    }
}
