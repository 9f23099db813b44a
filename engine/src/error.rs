//! Engine errors.

use bearer_store::StoreError;
use bearer_types::{HolderId, HolderKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid argument {name}: '{value}'")]
    InvalidArgument { name: &'static str, value: String },

    #[error("wrong number of arguments for {command}: expected {expected}, got {got}")]
    WrongArgumentCount {
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("{kind} {id} not found")]
    HolderNotFound { kind: HolderKind, id: HolderId },

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("insufficient balance: holder {holder} has {available} tokens, needs {needed}")]
    InsufficientBalance {
        holder: HolderId,
        needed: u64,
        available: u64,
    },

    #[error("holder {0} has no tokens")]
    EmptyBalance(HolderId),

    #[error("buyer and seller are the same holder: {0}")]
    SameHolder(HolderId),

    #[error("holder id {0} is used more than once")]
    DuplicateHolder(HolderId),

    #[error("no unique token value found after {attempts} attempts")]
    TokenCollision { attempts: usize },

    #[error("failed to encode or decode {key}: {reason}")]
    Codec { key: String, reason: String },

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Whether this is one of the "referenced thing is absent" errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HolderNotFound { .. } | Self::KeyNotFound(_))
    }

    /// Whether the error was raised before anything was staged for writing.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Store(_) | Self::Codec { .. })
    }
}
