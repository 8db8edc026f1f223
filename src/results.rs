// src/results.rs

//! Per-pass result stores.
//!
//! Exactly one shape is active per pass:
//!
//! - [`IndexedResults`] when the submitted batch was an ordered list; each
//!   task's outputs land in the slot matching its submission position.
//! - [`KeyedResults`] when the submitted batch was a named set; each task's
//!   outputs land under its key.
//!
//! Both stores are populated once per task, exactly when that task
//! completes successfully, and are returned to the caller by value as a
//! finished snapshot. A slot or key left empty means the owning task
//! failed, or the pass was short-circuited before the task ran. The
//! panicking accessors ([`IndexedResults::index`], [`KeyedResults::key`])
//! treat reading such an entry as a programming error; use the `get`
//! variants to inspect partial results after a failed pass.

use std::collections::HashMap;

use crate::task::TaskKey;

/// Position-keyed result store for ordered task batches.
#[derive(Debug)]
pub struct IndexedResults<T> {
    slots: Vec<Option<Vec<T>>>,
}

impl<T> IndexedResults<T> {
    pub(crate) fn with_slots(total: usize) -> Self {
        let mut slots = Vec::with_capacity(total);
        slots.resize_with(total, || None);
        Self { slots }
    }

    pub(crate) fn insert(&mut self, index: usize, values: Vec<T>) {
        self.slots[index] = Some(values);
    }

    /// Outputs of the task submitted at `index`, if it completed.
    pub fn get(&self, index: usize) -> Option<&[T]> {
        self.slots.get(index).and_then(|slot| slot.as_deref())
    }

    /// Outputs of the task submitted at `index`.
    ///
    /// # Panics
    ///
    /// Panics if no task was submitted at `index`, or if the task at
    /// `index` did not complete successfully.
    pub fn index(&self, index: usize) -> &[T] {
        match self.slots.get(index) {
            Some(Some(values)) => values,
            Some(None) => panic!("no result recorded for task at index {index}"),
            None => panic!("no task was submitted at index {index}"),
        }
    }

    /// Number of tasks that completed successfully.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of tasks submitted in the batch, completed or not.
    pub fn slots(&self) -> usize {
        self.slots.len()
    }
}

/// Name-keyed result store for named task sets.
#[derive(Debug)]
pub struct KeyedResults<T> {
    entries: HashMap<TaskKey, Vec<T>>,
}

impl<T> KeyedResults<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, key: TaskKey, values: Vec<T>) {
        self.entries.insert(key, values);
    }

    /// Outputs of the task named `key`, if it completed.
    pub fn get(&self, key: &str) -> Option<&[T]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Outputs of the task named `key`.
    ///
    /// # Panics
    ///
    /// Panics if no result was recorded under `key`.
    pub fn key(&self, key: &str) -> &[T] {
        match self.entries.get(key) {
            Some(values) => values,
            None => panic!("no result recorded for task '{key}'"),
        }
    }

    /// Number of tasks that completed successfully.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of all recorded results, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
