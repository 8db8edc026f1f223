// src/task.rs

//! The task contract: one opaque, independently schedulable unit of work.
//!
//! The engine never inspects what a task does; it only drives the
//! [`Task::run`] contract and routes the produced values or error. Adapting
//! richer callable shapes (extra arguments, typed outputs, callback styles)
//! to this contract is the caller's job, typically via [`task_fn`].

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::TaskError;

/// Canonical task identifier used in named task sets and keyed results.
pub type TaskKey = String;

/// Future returned by a running task: the task's ordered output values, or
/// the error that failed it.
pub type TaskFuture<T> = Pin<Box<dyn Future<Output = std::result::Result<Vec<T>, TaskError>> + Send>>;

/// Shared handle to a task, as submitted to the engine.
///
/// The engine holds the handle only for the duration of one pass and never
/// retains it afterwards.
pub type ArcTask<T> = Arc<dyn Task<T>>;

/// One opaque unit of work.
pub trait Task<T>: Send + Sync {
    fn run(&self, input: TaskInput<T>) -> TaskFuture<T>;
}

/// Input handed to a task when it is dispatched.
#[derive(Debug, Clone)]
pub enum TaskInput<T> {
    /// No input: plain batch tasks, and graph tasks with no dependencies.
    Empty,
    /// Positional arguments piped from the previous task (waterfall mode).
    Args(Vec<T>),
    /// Outputs of the task's declared dependencies, keyed by dependency
    /// name (graph mode). Every declared dependency has an entry.
    Deps(HashMap<TaskKey, Vec<T>>),
}

impl<T> TaskInput<T> {
    /// Consume the input as positional arguments.
    ///
    /// Returns an empty list for the `Empty` and `Deps` shapes.
    pub fn into_args(self) -> Vec<T> {
        match self {
            TaskInput::Args(args) => args,
            TaskInput::Empty | TaskInput::Deps(_) => Vec::new(),
        }
    }

    /// Look up one dependency's outputs by name.
    ///
    /// Returns `None` for the `Empty` and `Args` shapes, or when `key` is
    /// not a declared dependency of this task.
    pub fn dep(&self, key: &str) -> Option<&[T]> {
        match self {
            TaskInput::Deps(deps) => deps.get(key).map(Vec::as_slice),
            TaskInput::Empty | TaskInput::Args(_) => None,
        }
    }

    /// Consume the input as a dependency map.
    pub fn into_deps(self) -> HashMap<TaskKey, Vec<T>> {
        match self {
            TaskInput::Deps(deps) => deps,
            TaskInput::Empty | TaskInput::Args(_) => HashMap::new(),
        }
    }
}

/// Adapter turning an async closure into a [`Task`].
pub struct FnTask<F> {
    f: F,
}

impl<T, F, Fut> Task<T> for FnTask<F>
where
    F: Fn(TaskInput<T>) -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Vec<T>, TaskError>> + Send + 'static,
{
    fn run(&self, input: TaskInput<T>) -> TaskFuture<T> {
        Box::pin((self.f)(input))
    }
}

/// Wrap an async closure as a shared task handle.
///
/// ```no_run
/// use rundag::task::{task_fn, TaskInput};
///
/// let double = task_fn(|input: TaskInput<i64>| async move {
///     let args = input.into_args();
///     Ok(args.into_iter().map(|v| v * 2).collect())
/// });
/// # let _ = double;
/// ```
pub fn task_fn<T, F, Fut>(f: F) -> ArcTask<T>
where
    T: 'static,
    F: Fn(TaskInput<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = std::result::Result<Vec<T>, TaskError>> + Send + 'static,
{
    Arc::new(FnTask { f })
}
