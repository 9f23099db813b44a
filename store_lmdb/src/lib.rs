//! LMDB storage backend for the custody engine.
//!
//! Implements [`bearer_store::KvStore`] using the `heed` LMDB bindings. All
//! keys live in a single `state` database; [`KvStore::commit`] runs inside
//! one LMDB write transaction, so a write set is applied all or nothing.
//!
//! [`KvStore::commit`]: bearer_store::KvStore::commit

pub mod environment;
pub mod error;
pub mod kv;
pub mod write_batch;

pub use environment::{LmdbEnvironment, DEFAULT_MAP_SIZE};
pub use error::LmdbError;
pub use write_batch::WriteBatch;
