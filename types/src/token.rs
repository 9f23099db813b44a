//! Bearer token representation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::HolderId;

/// Characters a token value is drawn from.
pub const TOKEN_ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Fixed length of every token value.
pub const TOKEN_LENGTH: usize = 10;

/// Opaque token value, e.g. `"qWeRtYuIoP"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenValue(String);

impl TokenValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the value has the minted shape: `TOKEN_LENGTH` ASCII letters.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() == TOKEN_LENGTH && self.0.bytes().all(|b| TOKEN_ALPHABET.contains(&b))
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A discrete bearer unit.
///
/// `owner` records the holder at the time the token was last persisted; the
/// authoritative ownership is the holder sequence the token sits in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    #[serde(rename = "token_value")]
    pub value: TokenValue,
    pub owner: HolderId,
}

impl Token {
    pub fn new(value: TokenValue, owner: HolderId) -> Self {
        Self { value, owner }
    }
}
