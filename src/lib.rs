// src/lib.rs

//! In-process task orchestration.
//!
//! `rundag` executes a batch of opaque tasks under one of several
//! disciplines:
//!
//! - [`waterfall()`] — strict sequence, piping each task's outputs into
//!   the next task's arguments.
//! - [`concurrent`] / [`concurrent_keyed`] — unbounded concurrent fan-out
//!   over an ordered list or a named set.
//! - [`parallel`] / [`parallel_keyed`] / [`parallel_with_limit`] — bounded
//!   concurrent fan-out (default bound: host parallelism).
//! - [`race`] — first task to finish decides the outcome; the rest are
//!   dropped.
//! - [`auto`] — dependency-graph scheduling: tasks declare named
//!   dependencies, the engine validates the graph up front, runs
//!   independent tasks concurrently in dependency order, and stops
//!   releasing new work on the first failure.
//!
//! A task is anything implementing [`task::Task`]; most callers wrap an
//! async closure with [`task::task_fn`]. Batch modes return the per-task
//! results together with `Option<Errors>` — `None` means every task
//! succeeded, and partial results are always returned alongside any
//! failures.

pub mod dag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod results;
pub mod task;
pub mod waterfall;

pub use dag::{DepGraph, Scheduler, TaskSet};
pub use errors::{Errors, Result, RundagError, TaskError};
pub use exec::{race, Concurrency};
pub use results::{IndexedResults, KeyedResults};
pub use task::{task_fn, ArcTask, FnTask, Task, TaskFuture, TaskInput, TaskKey};
pub use waterfall::waterfall;

/// Run every task concurrently with no admission bound.
///
/// Returns once every task has reported; failures accumulate rather than
/// short-circuiting the batch.
pub async fn concurrent<T>(tasks: Vec<ArcTask<T>>) -> (IndexedResults<T>, Option<Errors>)
where
    T: Send + 'static,
{
    exec::run_batch(tasks, Concurrency::Unbounded).await
}

/// Run every task concurrently, admitting at most the host's available
/// parallelism at once.
pub async fn parallel<T>(tasks: Vec<ArcTask<T>>) -> (IndexedResults<T>, Option<Errors>)
where
    T: Send + 'static,
{
    exec::run_batch(tasks, Concurrency::available()).await
}

/// Like [`parallel`], with an explicit admission bound.
pub async fn parallel_with_limit<T>(
    tasks: Vec<ArcTask<T>>,
    limit: Concurrency,
) -> (IndexedResults<T>, Option<Errors>)
where
    T: Send + 'static,
{
    exec::run_batch(tasks, limit).await
}

/// [`concurrent`] over a named set; results are keyed by task name.
pub async fn concurrent_keyed<T>(
    tasks: Vec<(TaskKey, ArcTask<T>)>,
) -> (KeyedResults<T>, Option<Errors>)
where
    T: Send + 'static,
{
    exec::run_batch_keyed(tasks, Concurrency::Unbounded).await
}

/// [`parallel`] over a named set; results are keyed by task name.
pub async fn parallel_keyed<T>(
    tasks: Vec<(TaskKey, ArcTask<T>)>,
) -> (KeyedResults<T>, Option<Errors>)
where
    T: Send + 'static,
{
    exec::run_batch_keyed(tasks, Concurrency::available()).await
}

/// Validate `set` into a dependency graph and execute one scheduling pass
/// over it.
///
/// Validation failures (unknown or cyclic dependencies) abort before any
/// task runs. Task failures during the pass do not: they are collected in
/// the returned aggregate while the results of every task that completed
/// before the first failure are still returned.
pub async fn auto<T>(set: TaskSet<T>) -> Result<(KeyedResults<T>, Option<Errors>)>
where
    T: Clone + Send + 'static,
{
    let graph = DepGraph::build(set)?;
    Ok(Scheduler::new(graph).run().await)
}
