//! Client configuration.
//!
//! Timeouts are compile-time constants: the only runtime input a client takes
//! is its optional base URL.

use std::time::Duration;

use crate::env_config::EnvironmentConfig;

pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const CONNECT_TIMEOUT: Duration = Duration::from_millis(15_000);
pub const SOCKET_TIMEOUT: Duration = Duration::from_millis(15_000);

pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Option<String>,
}

impl ClientConfig {
    /// Blank or whitespace-only base URLs are treated as absent.
    pub fn new(base_url: Option<&str>) -> Self {
        let base_url = base_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        Self { base_url }
    }

    /// Snapshot of the process-wide `EnvironmentConfig`.
    pub fn from_env_config() -> Self {
        Self::new(EnvironmentConfig::base_url().as_deref())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }
}
