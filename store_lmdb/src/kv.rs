//! LMDB implementation of KvStore.

use bearer_store::{KvStore, StoreError, WriteOp, WriteSet};

use crate::environment::LmdbEnvironment;
use crate::LmdbError;

impl KvStore for LmdbEnvironment {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let rtxn = self.env().read_txn().map_err(LmdbError::from)?;
        let value = self
            .state_db
            .get(&rtxn, key.as_bytes())
            .map_err(LmdbError::from)?;
        Ok(value.map(<[u8]>::to_vec))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        let mut wtxn = self.env().write_txn().map_err(LmdbError::from)?;
        self.state_db
            .put(&mut wtxn, key.as_bytes(), value)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut wtxn = self.env().write_txn().map_err(LmdbError::from)?;
        self.state_db
            .delete(&mut wtxn, key.as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn commit(&self, batch: WriteSet) -> Result<(), StoreError> {
        let mut txn = self.write_batch()?;
        for op in batch {
            match op {
                WriteOp::Put { key, value } => txn.put(&key, &value)?,
                WriteOp::Delete { key } => txn.delete(&key)?,
            }
        }
        txn.commit()
    }

    fn supports_atomic_commit(&self) -> bool {
        true
    }
}
