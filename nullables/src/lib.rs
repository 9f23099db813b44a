//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies of the engine (storage, randomness) are abstracted
//! behind traits. This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically (including injected write failures)
//! - Never touch the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod random;
pub mod store;

pub use random::NullRandom;
pub use store::NullStore;
