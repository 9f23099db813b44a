//! Bearer-token custody and transfer engine.
//!
//! Institutions issue opaque tokens, merchants receive them through cash-in,
//! pass them between each other, and return them through cash-out. All state
//! lives in a [`bearer_store::KvStore`]; each operation commits its writes in
//! one batch and appends one entry to the transaction ledger.

mod codec;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod pool;
pub mod query;
pub mod registry;
pub mod request;

pub use command::{invoke, query, InvokeCommand, QueryCommand};
pub use config::EngineConfig;
pub use engine::TransferEngine;
pub use error::EngineError;
pub use ledger::TransactionLedger;
pub use pool::TokenPool;
pub use query::QueryLayer;
pub use registry::HolderRegistry;
pub use request::{CashIn, CashOut, DemoSeed, HolderSeed, MerchantSeed, TokenTransfer};
