//! Configuration and store wiring for the `bearer-cli` binary.

pub mod config;

pub use config::{CliConfig, ConfigError, Overrides};

use bearer_engine::TransferEngine;
use bearer_store_lmdb::LmdbEnvironment;

/// Open the LMDB store under `config.data_dir` and build an engine on it.
pub fn open_engine(config: &CliConfig) -> Result<TransferEngine<LmdbEnvironment>, bearer_store_lmdb::LmdbError> {
    let env = LmdbEnvironment::open(&config.data_dir, config.map_size_bytes())?;
    Ok(TransferEngine::new(env, config.engine.clone()))
}
