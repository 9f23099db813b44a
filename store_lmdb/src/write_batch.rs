//! Write batching: groups every write of one engine operation into a single
//! LMDB write transaction.
//!
//! # Usage
//!
//! ```ignore
//! let mut batch = env.write_batch()?;
//! batch.put("11", &merchant_bytes)?;
//! batch.put("_merchants", &collection_bytes)?;
//! batch.commit()?;
//! ```
//!
//! If the batch is dropped without calling [`WriteBatch::commit`], all
//! operations are rolled back (the underlying LMDB transaction is aborted).

use heed::RwTxn;

use bearer_store::StoreError;

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

pub struct WriteBatch<'a> {
    txn: RwTxn<'a>,
    env: &'a LmdbEnvironment,
    ops: usize,
}

impl<'a> WriteBatch<'a> {
    pub(crate) fn new(env: &'a LmdbEnvironment) -> Result<Self, StoreError> {
        let txn = env.env().write_txn().map_err(LmdbError::from)?;
        Ok(Self { txn, env, ops: 0 })
    }

    pub fn put(&mut self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.env
            .state_db
            .put(&mut self.txn, key.as_bytes(), value)
            .map_err(LmdbError::from)?;
        self.ops += 1;
        Ok(())
    }

    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.env
            .state_db
            .delete(&mut self.txn, key.as_bytes())
            .map_err(LmdbError::from)?;
        self.ops += 1;
        Ok(())
    }

    /// Read through the batch, seeing its own uncommitted writes.
    pub fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let value = self
            .env
            .state_db
            .get(&self.txn, key.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(value.map(<[u8]>::to_vec))
    }

    /// Commit all batched operations in a single write transaction.
    pub fn commit(self) -> Result<(), StoreError> {
        let ops = self.ops;
        self.txn.commit().map_err(LmdbError::from)?;
        tracing::debug!(ops, "committed LMDB write batch");
        Ok(())
    }
}
