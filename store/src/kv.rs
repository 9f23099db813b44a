//! Key/value store trait.

use crate::{StoreError, WriteOp, WriteSet};

/// String-keyed blob store.
///
/// `get`, `put` and `delete` are each individually atomic. Nothing is
/// assumed about multi-key atomicity unless the backend says so through
/// [`KvStore::supports_atomic_commit`].
pub trait KvStore {
    /// Read a key. `Ok(None)` when absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Apply every operation of `batch` in order.
    ///
    /// The default applies operations one at a time and stops at the first
    /// failure, leaving the earlier operations applied. Backends with a
    /// transaction primitive override this to apply all or nothing.
    fn commit(&self, batch: WriteSet) -> Result<(), StoreError> {
        for op in batch {
            match op {
                WriteOp::Put { key, value } => self.put(&key, &value)?,
                WriteOp::Delete { key } => self.delete(&key)?,
            }
        }
        Ok(())
    }

    /// Whether [`KvStore::commit`] is all-or-nothing.
    fn supports_atomic_commit(&self) -> bool {
        false
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }

    fn commit(&self, batch: WriteSet) -> Result<(), StoreError> {
        (**self).commit(batch)
    }

    fn supports_atomic_commit(&self) -> bool {
        (**self).supports_atomic_commit()
    }
}
