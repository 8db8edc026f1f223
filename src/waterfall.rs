// src/waterfall.rs

//! Strict sequential execution with value piping.

use tracing::{debug, warn};

use crate::errors::{Result, RundagError};
use crate::task::{ArcTask, TaskInput};

/// Run `tasks` one at a time, in order, feeding each task's outputs to the
/// next task as its arguments. The first task receives `first_args`.
///
/// Stops at the first task that reports an error; that error is returned
/// and no further task runs. An empty task list returns `first_args`
/// unchanged.
pub async fn waterfall<T>(tasks: &[ArcTask<T>], first_args: Vec<T>) -> Result<Vec<T>> {
    let mut args = first_args;

    for (position, task) in tasks.iter().enumerate() {
        debug!(position, "running sequenced task");

        match task.run(TaskInput::Args(args)).await {
            Ok(outputs) => args = outputs,
            Err(err) => {
                warn!(position, error = %err, "sequenced task failed; stopping pipeline");
                return Err(RundagError::Task(err));
            }
        }
    }

    Ok(args)
}
