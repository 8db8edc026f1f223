// src/errors.rs

//! Crate-wide error types.
//!
//! Two kinds of failure exist in the engine:
//!
//! - [`RundagError`] covers everything detected *by the engine*: graph
//!   validation failures (which abort before any task runs) and the
//!   pass-level wrappers around task failures.
//! - [`Errors`] is the ordered aggregate of failures reported *by tasks*
//!   during one concurrent pass. Task errors are opaque [`anyhow::Error`]
//!   values; the engine never inspects them, it only collects them.

use std::fmt;

use thiserror::Error;

/// Opaque error currency for failures reported by individual tasks.
pub type TaskError = anyhow::Error;

#[derive(Error, Debug)]
pub enum RundagError {
    #[error("task '{task}' has unknown dependency '{dep}'")]
    UnresolvedDependency { task: String, dep: String },

    #[error("task '{task}' cannot depend on itself")]
    SelfDependency { task: String },

    #[error("cycle detected in task graph involving task '{0}'")]
    Cycle(String),

    #[error("cannot race an empty task list")]
    EmptyRace,

    #[error(transparent)]
    Task(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RundagError>;

/// Ordered collection of task failures from one pass.
///
/// Failures are appended in completion order. The aggregate is only ever
/// handed to callers non-empty: pass entry points return `Option<Errors>`,
/// with `None` meaning every task succeeded.
#[derive(Debug, Default)]
pub struct Errors {
    errors: Vec<TaskError>,
}

impl Errors {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, err: TaskError) {
        self.errors.push(err);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterate over the collected failures in completion order.
    pub fn iter(&self) -> impl Iterator<Item = &TaskError> {
        self.errors.iter()
    }

    pub fn into_inner(self) -> Vec<TaskError> {
        self.errors
    }

    /// Translate the aggregate to the API boundary: an empty aggregate
    /// becomes `None` rather than an error value with zero members.
    pub(crate) fn into_option(self) -> Option<Errors> {
        if self.errors.is_empty() { None } else { Some(self) }
    }
}

impl fmt::Display for Errors {
    /// Renders all member messages separated by a single space.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Errors {}
