//! JSON value codec used by every backend.

use serde::{de::DeserializeOwned, Serialize};

use crate::errors::{Result, StoreError};

/// Encode a value as compact JSON.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(StoreError::Encode)
}

/// Decode the bytes stored under `key`.
pub fn decode<T: DeserializeOwned>(key: &str, data: &[u8]) -> Result<T> {
    serde_json::from_slice(data).map_err(|e| StoreError::decode(key, e.to_string()))
}

/// Text form of an encoded value, for containers that only hold strings
/// (ConfigMap data, Secret stringData, annotations).
pub(crate) fn as_text<'a>(key: &str, data: &'a [u8]) -> Result<&'a str> {
    std::str::from_utf8(data)
        .map_err(|e| StoreError::invalid_value(key, format!("value is not valid UTF-8: {}", e)))
}
