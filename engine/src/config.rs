//! Engine tuning knobs, embedded as the `[engine]` table of the CLI config.

use serde::{Deserialize, Serialize};

use bearer_types::HolderId;

fn default_reset_id_range_start() -> i64 {
    0
}

fn default_reset_id_range_end() -> i64 {
    1000
}

fn default_max_mint_attempts() -> usize {
    16
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// First numeric holder key removed by `resetAll` (inclusive).
    #[serde(default = "default_reset_id_range_start")]
    pub reset_id_range_start: i64,

    /// End of the numeric holder key range removed by `resetAll` (exclusive).
    #[serde(default = "default_reset_id_range_end")]
    pub reset_id_range_end: i64,

    /// Draws allowed per token before minting gives up with a collision error.
    #[serde(default = "default_max_mint_attempts")]
    pub max_mint_attempts: usize,

    /// Seed for the token value generator. Unset means OS entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reset_id_range_start: default_reset_id_range_start(),
            reset_id_range_end: default_reset_id_range_end(),
            max_mint_attempts: default_max_mint_attempts(),
            rng_seed: None,
        }
    }
}

impl EngineConfig {
    /// Holder ids whose snapshot keys a bulk reset deletes.
    pub fn reset_ids(&self) -> impl Iterator<Item = HolderId> {
        (self.reset_id_range_start..self.reset_id_range_end).map(HolderId::new)
    }
}
