//! Ready-made task builders for integration tests.
//!
//! Each builder returns an [`ArcTask`] so tests can assemble batches and
//! task sets without spelling out closures everywhere.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use rundag::task::{task_fn, ArcTask};

/// Task that succeeds immediately with the given values.
pub fn ok_task<T>(values: Vec<T>) -> ArcTask<T>
where
    T: Clone + Send + Sync + 'static,
{
    task_fn(move |_input| {
        let values = values.clone();
        async move { Ok(values) }
    })
}

/// Task that fails immediately with the given message.
pub fn fail_task<T>(message: &str) -> ArcTask<T>
where
    T: Send + 'static,
{
    let message = message.to_string();
    task_fn(move |_input| {
        let message = message.clone();
        async move { Err(anyhow!(message)) }
    })
}

/// Task that sleeps for `delay`, then succeeds with the given values.
pub fn sleep_ok_task<T>(delay: Duration, values: Vec<T>) -> ArcTask<T>
where
    T: Clone + Send + Sync + 'static,
{
    task_fn(move |_input| {
        let values = values.clone();
        async move {
            tokio::time::sleep(delay).await;
            Ok(values)
        }
    })
}

/// Task that sleeps for `delay`, then fails with the given message.
pub fn sleep_fail_task<T>(delay: Duration, message: &str) -> ArcTask<T>
where
    T: Send + 'static,
{
    let message = message.to_string();
    task_fn(move |_input| {
        let message = message.clone();
        async move {
            tokio::time::sleep(delay).await;
            Err(anyhow!(message))
        }
    })
}

/// Task that appends `name` to `log` when it starts, then succeeds with the
/// given values. The log is the observed start order.
pub fn recording_task<T>(
    name: &str,
    log: Arc<Mutex<Vec<String>>>,
    values: Vec<T>,
) -> ArcTask<T>
where
    T: Clone + Send + Sync + 'static,
{
    let name = name.to_string();
    task_fn(move |_input| {
        log.lock().unwrap().push(name.clone());
        let values = values.clone();
        async move { Ok(values) }
    })
}

/// Task that tracks how many probe tasks run at the same instant.
///
/// Increments `active` on start, records the high-water mark into
/// `max_seen`, holds for `hold`, then decrements and succeeds with no
/// outputs.
pub fn probe_task<T>(
    active: Arc<AtomicUsize>,
    max_seen: Arc<AtomicUsize>,
    hold: Duration,
) -> ArcTask<T>
where
    T: Send + 'static,
{
    task_fn(move |_input| {
        let active = active.clone();
        let max_seen = max_seen.clone();
        async move {
            let now_running = active.fetch_add(1, Ordering::SeqCst) + 1;
            max_seen.fetch_max(now_running, Ordering::SeqCst);

            tokio::time::sleep(hold).await;

            active.fetch_sub(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    })
}
