//! In-memory [`EntityStore`] with staged writes.
//!
//! Useful for tests and for the CLI. Writes are staged until `commit`;
//! `rollback` discards them. Failures can be injected per call site, and
//! every call is counted.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::entity::{Entity, EntityStore};
use crate::error::StorageError;

/// Store call sites a failure can be injected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailPoint {
    /// `fetch_by_key`
    Fetch,
    /// `add`
    Add,
    /// `delete`
    Delete,
    /// `commit`
    Commit,
}

/// Snapshot of how often each store method was called.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// `fetch_by_key` calls.
    pub fetch: usize,
    /// `add` calls.
    pub add: usize,
    /// `delete` calls.
    pub delete: usize,
    /// `commit` calls.
    pub commit: usize,
    /// `rollback` calls.
    pub rollback: usize,
}

impl CallCounts {
    /// Total calls of any kind.
    pub fn total(&self) -> usize {
        self.fetch + self.add + self.delete + self.commit + self.rollback
    }
}

#[derive(Debug, Default)]
struct Counters {
    fetch: AtomicUsize,
    add: AtomicUsize,
    delete: AtomicUsize,
    commit: AtomicUsize,
    rollback: AtomicUsize,
}

#[derive(Debug)]
enum Staged<E> {
    Upsert(E),
    Remove(u64),
}

#[derive(Debug)]
struct Inner<E> {
    committed: BTreeMap<u64, E>,
    staged: Vec<Staged<E>>,
    next_id: u64,
    failures: BTreeMap<FailPoint, StorageError>,
}

impl<E> Default for Inner<E> {
    fn default() -> Self {
        Self {
            committed: BTreeMap::new(),
            staged: Vec::new(),
            next_id: 1,
            failures: BTreeMap::new(),
        }
    }
}

/// Transactional in-memory store.
#[derive(Debug)]
pub struct MemoryStore<E> {
    inner: Mutex<Inner<E>>,
    counters: Counters,
}

impl<E: Entity> MemoryStore<E> {
    /// An empty store. Keys start at 1.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            counters: Counters::default(),
        }
    }

    /// Stores `entity` as already committed, assigning a key if it has none.
    /// Not counted.
    pub fn seed(&self, mut entity: E) -> E {
        let mut inner = self.lock();
        let id = match entity.id() {
            Some(id) => {
                inner.next_id = inner.next_id.max(id + 1);
                id
            }
            None => {
                let id = inner.next_id;
                inner.next_id += 1;
                entity.set_id(id);
                id
            }
        };
        inner.committed.insert(id, entity.clone());
        entity
    }

    /// Makes the next call at `point` fail with `error`.
    pub fn fail_next(&self, point: FailPoint, error: StorageError) {
        self.lock().failures.insert(point, error);
    }

    /// Call counts so far.
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            fetch: self.counters.fetch.load(Ordering::Relaxed),
            add: self.counters.add.load(Ordering::Relaxed),
            delete: self.counters.delete.load(Ordering::Relaxed),
            commit: self.counters.commit.load(Ordering::Relaxed),
            rollback: self.counters.rollback.load(Ordering::Relaxed),
        }
    }

    /// Number of committed entities.
    pub fn len(&self) -> usize {
        self.lock().committed.len()
    }

    /// Returns `true` if nothing is committed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of writes waiting for `commit`.
    pub fn staged(&self) -> usize {
        self.lock().staged.len()
    }

    /// Committed entities in key order.
    pub fn all(&self) -> Vec<E> {
        self.lock().committed.values().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn injected(inner: &mut Inner<E>, point: FailPoint) -> Result<(), StorageError> {
        match inner.failures.remove(&point) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> EntityStore<E> for MemoryStore<E> {
    fn fetch_by_key(&self, key: u64) -> Result<Option<E>, StorageError> {
        self.counters.fetch.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.lock();
        Self::injected(&mut inner, FailPoint::Fetch)?;
        Ok(inner.committed.get(&key).cloned())
    }

    fn add(&self, entity: &mut E) -> Result<(), StorageError> {
        self.counters.add.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.lock();
        Self::injected(&mut inner, FailPoint::Add)?;
        if entity.id().is_none() {
            let id = inner.next_id;
            inner.next_id += 1;
            entity.set_id(id);
        }
        inner.staged.push(Staged::Upsert(entity.clone()));
        Ok(())
    }

    fn delete(&self, entity: &E) -> Result<(), StorageError> {
        self.counters.delete.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.lock();
        Self::injected(&mut inner, FailPoint::Delete)?;
        let id = entity
            .id()
            .ok_or_else(|| StorageError::constraint("cannot delete an entity without a key"))?;
        inner.staged.push(Staged::Remove(id));
        Ok(())
    }

    fn commit(&self) -> Result<(), StorageError> {
        self.counters.commit.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.lock();
        Self::injected(&mut inner, FailPoint::Commit)?;
        let staged = std::mem::take(&mut inner.staged);
        for write in staged {
            match write {
                Staged::Upsert(entity) => {
                    if let Some(id) = entity.id() {
                        inner.committed.insert(id, entity);
                    }
                }
                Staged::Remove(id) => {
                    inner.committed.remove(&id);
                }
            }
        }
        Ok(())
    }

    fn rollback(&self) {
        self.counters.rollback.fetch_add(1, Ordering::Relaxed);
        self.lock().staged.clear();
    }
}
