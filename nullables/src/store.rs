//! Nullable store: thread-safe in-memory key/value storage for testing.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bearer_store::{KvStore, StoreError, WriteOp, WriteSet};

/// An in-memory [`KvStore`].
///
/// By default `commit` is atomic: the whole write set is applied under one
/// lock, or nothing is. [`NullStore::sequential`] builds a store that applies
/// write sets one key at a time, like a backend without transactions.
///
/// [`NullStore::fail_after_writes`] arms a write budget: once it is spent,
/// every put/delete fails with [`StoreError::Backend`].
pub struct NullStore {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
    write_budget: Mutex<Option<usize>>,
    atomic: bool,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            write_budget: Mutex::new(None),
            atomic: true,
        }
    }

    /// A store without multi-key atomicity.
    pub fn sequential() -> Self {
        Self {
            atomic: false,
            ..Self::new()
        }
    }

    /// Allow `writes` more put/delete operations, then fail every one after.
    pub fn fail_after_writes(&self, writes: usize) {
        *lock(&self.write_budget) = Some(writes);
    }

    /// Remove any armed write failure.
    pub fn clear_failure(&self) {
        *lock(&self.write_budget) = None;
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }

    /// All stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        lock(&self.entries).keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    /// Copy of the full contents, for before/after comparisons.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        lock(&self.entries).clone()
    }

    fn spend_writes(budget: &mut Option<usize>, writes: usize, key: &str) -> Result<(), StoreError> {
        match budget {
            Some(remaining) if *remaining < writes => {
                *remaining = 0;
                Err(StoreError::Backend(format!("injected write failure on key {key}")))
            }
            Some(remaining) => {
                *remaining -= writes;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KvStore for NullStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        Self::spend_writes(&mut lock(&self.write_budget), 1, key)?;
        lock(&self.entries).insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        Self::spend_writes(&mut lock(&self.write_budget), 1, key)?;
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn commit(&self, batch: WriteSet) -> Result<(), StoreError> {
        if !self.atomic {
            for op in batch {
                match op {
                    WriteOp::Put { key, value } => self.put(&key, &value)?,
                    WriteOp::Delete { key } => self.delete(&key)?,
                }
            }
            return Ok(());
        }

        let mut budget = lock(&self.write_budget);
        let mut entries = lock(&self.entries);
        let first_key = batch.keys().next().unwrap_or_default().to_string();
        let mut remaining = *budget;
        Self::spend_writes(&mut remaining, batch.len(), &first_key)?;

        for op in batch {
            match op {
                WriteOp::Put { key, value } => {
                    entries.insert(key, value);
                }
                WriteOp::Delete { key } => {
                    entries.remove(&key);
                }
            }
        }
        *budget = remaining;
        Ok(())
    }

    fn supports_atomic_commit(&self) -> bool {
        self.atomic
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
