// src/exec/worker.rs

//! Single-worker spawn primitive shared by the batch dispatcher and the
//! dependency-graph scheduler.

use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};
use tracing::debug;

use crate::errors::TaskError;
use crate::task::{ArcTask, TaskInput};

/// Outcome of one worker, reported exactly once over the pass channel.
pub(crate) struct WorkerReport<K, T> {
    pub id: K,
    pub outcome: std::result::Result<Vec<T>, TaskError>,
}

/// Spawn one worker for `task`.
///
/// The worker:
/// - waits for an admission permit when the pass is bounded;
/// - runs the task to completion;
/// - reports its outcome over `report_tx` and exits.
///
/// The report channel must be buffered to the full batch size: the receiver
/// may stop listening before every worker has reported (race mode, or a
/// fail-fast pass draining stragglers), and a worker must never block or
/// leak on its final send.
pub(crate) fn spawn_worker<K, T>(
    id: K,
    task: ArcTask<T>,
    input: TaskInput<T>,
    report_tx: mpsc::Sender<WorkerReport<K, T>>,
    admission: Option<Arc<Semaphore>>,
) where
    K: Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(async move {
        let _permit = match admission {
            Some(semaphore) => match semaphore.acquire_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    // Semaphore closed: the pass is gone, nothing to run.
                    debug!("admission semaphore closed before worker started");
                    return;
                }
            },
            None => None,
        };

        let outcome = task.run(input).await;

        // A closed channel means the pass already has its answer; the
        // outcome is dropped, per the weak-cancellation model.
        let _ = report_tx.send(WorkerReport { id, outcome }).await;
    });
}
