// src/dag/mod.rs

//! Dependency-graph mode.
//!
//! - [`graph`] declares named task sets and validates them into a
//!   dependency graph (referential integrity + acyclicity) before any task
//!   runs.
//! - [`scheduler`] executes one pass over a validated graph, releasing
//!   tasks as their dependencies succeed and stopping new work on the
//!   first failure.

pub mod graph;
pub mod scheduler;

pub use graph::{DepGraph, TaskSet};
pub use scheduler::Scheduler;
