//! Row encoding (bincode).

use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{StorageError, StorageResult};

pub fn encode<T: Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> StorageResult<T> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Corrupt {
        key: printable_key(key),
        reason: e.to_string(),
    })
}

/// Render a key for error messages: ASCII prefix followed by hex.
pub fn printable_key(key: &[u8]) -> String {
    let split = key.iter().position(|b| *b == b':').map_or(0, |i| i + 1);
    let (prefix, rest) = key.split_at(split);
    let mut out = String::from_utf8_lossy(prefix).into_owned();
    for b in rest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
