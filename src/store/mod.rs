//! Record storage behind a small repository trait.
//!
//! Services only see `Arc<dyn Repository<T>>`, so a persistent backend can be
//! swapped in without touching them. The in-memory implementation is the only
//! one shipped.

use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::errors::ServiceError;

/// A stored record with a repository-assigned numeric id.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> u64;
    fn assign_id(&mut self, id: u64);

    /// Natural key that must be unique within one store, already case-folded.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

pub trait Repository<T: Record>: Send + Sync {
    /// Stores `record` under a fresh id and returns the stored copy.
    ///
    /// Fails with `Conflict` when another record already holds its unique key.
    fn insert(&self, record: T) -> Result<T, ServiceError>;

    fn get(&self, id: u64) -> Option<T>;

    /// All records ordered by id.
    fn all(&self) -> Vec<T>;

    /// Applies `mutate` to a copy of the record and commits it only if `mutate` succeeds.
    ///
    /// Returns `Ok(None)` when no record has this id, and `Conflict` when the
    /// edit moves the record onto a unique key held by another record.
    fn update(
        &self,
        id: u64,
        mutate: &mut dyn FnMut(&mut T) -> Result<(), ServiceError>,
    ) -> Result<Option<T>, ServiceError>;

    fn remove(&self, id: u64) -> Option<T>;

    fn count(&self) -> usize;
}

/// Thread-safe map-backed repository.
///
/// Ids come from a monotonic counter and are never handed out twice, even
/// after the record that held one is removed. Unique keys are claimed through
/// a second map, so the check and the claim happen under one shard lock.
pub struct InMemoryRepository<T> {
    records: DashMap<u64, T>,
    keys: DashMap<String, u64>,
    next_id: AtomicU64,
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: DashMap::new(),
            keys: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn release_key(&self, key: &str, owner: u64) {
        self.keys.remove_if(key, |_, holder| *holder == owner);
    }
}

fn duplicate_key(key: &str) -> ServiceError {
    ServiceError::Conflict(format!("{} already exists", key))
}

/// A fresh, empty in-memory store behind the repository trait.
pub fn in_memory<T: Record>() -> Arc<dyn Repository<T>> {
    Arc::new(InMemoryRepository::<T>::new())
}

impl<T: Record> Repository<T> for InMemoryRepository<T> {
    fn insert(&self, mut record: T) -> Result<T, ServiceError> {
        let id = match record.unique_key() {
            Some(key) => match self.keys.entry(key) {
                Entry::Occupied(taken) => return Err(duplicate_key(taken.key())),
                Entry::Vacant(free) => *free.insert(self.allocate_id()),
            },
            None => self.allocate_id(),
        };
        record.assign_id(id);
        self.records.insert(id, record.clone());
        Ok(record)
    }

    fn get(&self, id: u64) -> Option<T> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    fn all(&self) -> Vec<T> {
        let mut records: Vec<T> = self
            .records
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|record| record.id());
        records
    }

    fn update(
        &self,
        id: u64,
        mutate: &mut dyn FnMut(&mut T) -> Result<(), ServiceError>,
    ) -> Result<Option<T>, ServiceError> {
        let Some(mut entry) = self.records.get_mut(&id) else {
            return Ok(None);
        };

        let mut draft = entry.value().clone();
        mutate(&mut draft)?;
        draft.assign_id(id);

        let old_key = entry.value().unique_key();
        let new_key = draft.unique_key();
        if new_key != old_key {
            if let Some(key) = new_key {
                match self.keys.entry(key) {
                    Entry::Occupied(taken) if *taken.get() != id => {
                        return Err(duplicate_key(taken.key()));
                    }
                    Entry::Occupied(_) => {}
                    Entry::Vacant(free) => {
                        free.insert(id);
                    }
                }
            }
            if let Some(key) = old_key {
                self.release_key(&key, id);
            }
        }

        *entry.value_mut() = draft.clone();
        Ok(Some(draft))
    }

    fn remove(&self, id: u64) -> Option<T> {
        let (_, record) = self.records.remove(&id)?;
        if let Some(key) = record.unique_key() {
            self.release_key(&key, id);
        }
        Some(record)
    }

    fn count(&self) -> usize {
        self.records.len()
    }
}
