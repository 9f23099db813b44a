//! Abstract storage traits for the custody engine.
//!
//! Every storage backend (LMDB, in-memory for testing) implements [`KvStore`].
//! The rest of the codebase depends only on the trait. Values are opaque
//! byte blobs; the engine owns their encoding.

pub mod error;
pub mod kv;
pub mod write_set;

pub use error::StoreError;
pub use kv::KvStore;
pub use write_set::{WriteOp, WriteSet};
