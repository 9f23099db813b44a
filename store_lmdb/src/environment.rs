//! LMDB environment setup.

use std::path::{Path, PathBuf};

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use bearer_store::StoreError;

use crate::write_batch::WriteBatch;
use crate::LmdbError;

const STATE_DB: &str = "state";

/// Default map size: 256 MiB. Registries and ledgers are whole-document
/// blobs, so growth is driven by the transaction ledger.
pub const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;

/// Wraps the LMDB environment and the single key/value database.
pub struct LmdbEnvironment {
    env: Env,
    pub(crate) state_db: Database<Bytes, Bytes>,
    path: PathBuf,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        let mut options = EnvOpenOptions::new();
        options.map_size(map_size).max_dbs(1);
        // SAFETY: the environment is opened once per directory within this
        // process and the data files are not modified by other programs.
        let env = unsafe { options.open(path)? };

        let mut wtxn = env.write_txn()?;
        let state_db: Database<Bytes, Bytes> = env.create_database(&mut wtxn, Some(STATE_DB))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            env,
            state_db,
            path: path.to_path_buf(),
        })
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Begin a write batch. Dropping it without committing rolls it back.
    pub fn write_batch(&self) -> Result<WriteBatch<'_>, StoreError> {
        WriteBatch::new(self)
    }

    /// Number of keys currently stored.
    pub fn entry_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.state_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
