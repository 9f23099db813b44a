//! Shared utilities for the custody workspace.

pub mod logging;

pub use logging::{init_logging, LogFormat};
