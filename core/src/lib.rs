//! Shared network core for the mobile app shells.
//!
//! # Overview
//! One configured HTTP client behind a small generic façade: JSON in and
//! out, fixed 15s timeouts, body-level `tracing` output, JSON default headers
//! and optional base-URL resolution. Application code builds a `NetService`,
//! calls `get_async` / `post_async` with its own serde types, and calls
//! `close` at teardown.
//!
//! # Design
//! - `EnvironmentConfig` is the process-wide default base URL. It is read once,
//!   as a `ClientConfig` snapshot, when a service is built.
//! - `ClientFactory` centralises codec, timeout, logging and engine policy.
//! - Each call is first described as an `HttpRequest`, then executed, then
//!   interpreted from an `HttpResponse`, so the policy is testable without I/O.
//! - Non-2xx responses are errors (`NetError::HttpStatus`). Nothing is retried.
//!
//! ```no_run
//! # async fn demo() -> Result<(), net_core::NetError> {
//! use net_core::{NetService, RequestOptions};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! let svc = NetService::with_base_url(Some("https://api.example.com/"))?;
//! let user: User = svc
//!     .get_async("users/1", RequestOptions::new().query("lang", Some("en")))
//!     .await?;
//! println!("{} {}", user.id, user.name);
//! svc.close();
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod env_config;
pub mod error;
pub mod factory;
pub mod http;
pub mod lenient;
pub mod options;
pub mod platform;
pub mod service;

pub use config::ClientConfig;
pub use env_config::EnvironmentConfig;
pub use error::{NetError, NetworkErrorKind};
pub use factory::{Client, ClientFactory};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::RequestOptions;
pub use platform::Engine;
pub use service::NetService;
