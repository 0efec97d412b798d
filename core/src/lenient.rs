//! Serde helpers for payload fields whose JSON type drifts between string and
//! scalar.
//!
//! ```
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Article {
//!     #[serde(deserialize_with = "net_core::lenient::number")]
//!     id: i64,
//!     #[serde(deserialize_with = "net_core::lenient::string")]
//!     author: String,
//! }
//!
//! let a: Article = serde_json::from_str(r#"{"id":"42","author":7}"#).unwrap();
//! assert_eq!(a.id, 42);
//! assert_eq!(a.author, "7");
//! ```

use std::str::FromStr;

use serde::{de::Error, Deserialize, Deserializer};
use serde_json::Value;

/// Accepts a JSON number or a string holding one.
pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().parse().map_err(D::Error::custom),
        Value::Number(n) => n.to_string().parse().map_err(D::Error::custom),
        other => Err(D::Error::custom(format!("expected number, found {other}"))),
    }
}

/// Accepts a string, number or bool and yields its textual form.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected string, found {other}"))),
    }
}

/// Accepts `true`/`false`, `"true"`/`"false"` and `0`/`1`.
pub fn bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::String(s) => s.trim().parse().map_err(D::Error::custom),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(D::Error::custom(format!("expected 0 or 1, found {n}"))),
        },
        other => Err(D::Error::custom(format!("expected bool, found {other}"))),
    }
}
