//! Transport profile per target platform.
//!
//! Exactly one profile is compiled in for each target OS; there is no runtime
//! selection and no fallback.

use std::time::Duration;

use reqwest::ClientBuilder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Android,
    Ios,
    Desktop,
}

impl Engine {
    #[cfg(target_os = "android")]
    pub const fn current() -> Self {
        Engine::Android
    }

    #[cfg(target_os = "ios")]
    pub const fn current() -> Self {
        Engine::Ios
    }

    #[cfg(not(any(target_os = "android", target_os = "ios")))]
    pub const fn current() -> Self {
        Engine::Desktop
    }

    pub fn name(self) -> &'static str {
        match self {
            Engine::Android => "android",
            Engine::Ios => "ios",
            Engine::Desktop => "desktop",
        }
    }

    /// Idle connections kept per host, and how long each may sit unused.
    ///
    /// Android mirrors OkHttp's default pool (5 connections, 5 minutes). iOS
    /// mirrors `URLSession` (4 connections per host) and drops idle sockets
    /// early because the system suspends backgrounded apps. Desktop keeps
    /// reqwest's defaults.
    pub fn pool_limits(self) -> Option<(usize, Duration)> {
        match self {
            Engine::Android => Some((5, Duration::from_secs(300))),
            Engine::Ios => Some((4, Duration::from_secs(30))),
            Engine::Desktop => None,
        }
    }

    /// Apply the platform's transport settings.
    pub(crate) fn configure(self, builder: ClientBuilder) -> ClientBuilder {
        let builder = builder
            .use_rustls_tls()
            .user_agent(format!("{}/{} ({})", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), self.name()));
        match self.pool_limits() {
            Some((max_idle, idle_timeout)) => builder
                .pool_max_idle_per_host(max_idle)
                .pool_idle_timeout(idle_timeout),
            None => builder,
        }
    }
}
