//! Process-wide default base URL.
//!
//! Startup code sets this once; `ClientConfig::from_env_config` takes a
//! snapshot when a client is built. Clients already constructed keep the
//! value they were built with, so a later `set_base_url` only affects
//! services created afterwards.

use std::sync::{PoisonError, RwLock};

static BASE_URL: RwLock<Option<String>> = RwLock::new(None);

/// Global network environment.
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    pub fn base_url() -> Option<String> {
        BASE_URL.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_base_url(value: Option<String>) {
        tracing::debug!(base_url = ?value, "environment base url updated");
        *BASE_URL.write().unwrap_or_else(PoisonError::into_inner) = value;
    }
}
