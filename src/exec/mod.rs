// src/exec/mod.rs

//! Concurrent execution layer.
//!
//! This module owns worker dispatch for every concurrent mode:
//!
//! - [`worker`] spawns one Tokio task per unit of work and reports its
//!   outcome exactly once over a buffered channel.
//! - [`dispatcher`] implements the batch modes (unbounded fan-out, bounded
//!   fan-out, race) on top of the worker primitive; the dependency-graph
//!   scheduler reuses the same primitive for its ready tasks.

pub mod dispatcher;
pub(crate) mod worker;

pub use dispatcher::{race, run_batch, run_batch_keyed, Concurrency};
