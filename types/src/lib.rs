//! Fundamental types for the bearer-token custody engine.
//!
//! This crate defines the records shared by every other crate in the workspace:
//! holders (institutions and merchants), tokens, audit transactions, and the
//! well-known store keys under which they are persisted.

pub mod holder;
pub mod keys;
pub mod token;
pub mod transaction;

pub use holder::{Holder, HolderId, HolderKind, Institution, Merchant};
pub use token::{Token, TokenValue, TOKEN_ALPHABET, TOKEN_LENGTH};
pub use transaction::{Transaction, TransactionId};
