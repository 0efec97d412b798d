//! JSON encoding and tolerant decoding.
//!
//! Unknown fields are ignored (serde's default, never overridden here). An
//! empty body decodes as `null`, so `()` and `Option<T>` succeed on 204s
//! while a struct still reports the missing document.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::NetError;

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, NetError> {
    serde_json::to_string(value).map_err(|e| NetError::Serialization(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, NetError> {
    if body.trim().is_empty() {
        return serde_json::from_value(serde_json::Value::Null)
            .map_err(|e| NetError::Decoding(format!("empty body: {e}")));
    }
    serde_json::from_str(body).map_err(|e| NetError::Decoding(e.to_string()))
}
