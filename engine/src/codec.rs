//! JSON encoding of stored values.

use serde::de::DeserializeOwned;
use serde::Serialize;

use bearer_store::KvStore;

use crate::error::EngineError;

pub(crate) fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Vec<u8>, EngineError> {
    serde_json::to_vec(value).map_err(|e| EngineError::Codec {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, EngineError> {
    serde_json::from_slice(bytes).map_err(|e| EngineError::Codec {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn load<T: DeserializeOwned, S: KvStore>(store: &S, key: &str) -> Result<Option<T>, EngineError> {
    match store.get(key)? {
        Some(bytes) => decode(key, &bytes).map(Some),
        None => Ok(None),
    }
}

/// Load a list value. An absent key and a stored JSON `null` both read as empty.
pub(crate) fn load_list<T: DeserializeOwned, S: KvStore>(store: &S, key: &str) -> Result<Vec<T>, EngineError> {
    Ok(load::<Option<Vec<T>>, S>(store, key)?.flatten().unwrap_or_default())
}
