//! Well-known store keys.
//!
//! Collections live under fixed underscore-prefixed keys; single-holder
//! snapshots live under the holder's stringified numeric id.

use crate::HolderId;

/// Full sequence of merchants.
pub const MERCHANTS_KEY: &str = "_merchants";

/// Full sequence of institutions ("payments" in the deployed schema).
pub const INSTITUTIONS_KEY: &str = "_payments";

/// Flat sequence of every token ever minted.
pub const TOKENS_KEY: &str = "_tokens";

/// The transaction ledger, oldest first.
pub const TRANSACTIONS_KEY: &str = "_transacoes";

/// Legacy key from the deployed schema. Never written, only cleared on reset.
pub const OPEN_TRADES_KEY: &str = "_opentrades";

/// Every fixed key, in the order bulk reset deletes them.
pub const COLLECTION_KEYS: [&str; 5] = [
    MERCHANTS_KEY,
    INSTITUTIONS_KEY,
    TOKENS_KEY,
    TRANSACTIONS_KEY,
    OPEN_TRADES_KEY,
];

/// Key of a single-holder snapshot.
pub fn holder_key(id: HolderId) -> String {
    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holder_key_is_plain_decimal() {
        assert_eq!(holder_key(HolderId::new(11)), "11");
        assert_eq!(holder_key(HolderId::new(-3)), "-3");
    }

    #[test]
    fn collection_keys_never_parse_as_holder_ids() {
        for key in COLLECTION_KEYS {
            assert!(key.parse::<HolderId>().is_err(), "{key} collides with an id key");
        }
    }
}
