//! Error taxonomy for the network core.
//!
//! # Design
//! Every failure reaches the immediate caller; nothing here is retried.
//! Transport failures are classified into a `NetworkErrorKind` so callers can
//! tell a timeout from a refused connection without inspecting `reqwest`
//! internals. Non-2xx answers are errors, carrying the status and raw body.

use std::error::Error as _;
use std::fmt;

use thiserror::Error;

/// Broad cause of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    ConnectionRefused,
    Dns,
    Tls,
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::ConnectionRefused => "connection refused",
            NetworkErrorKind::Dns => "dns failure",
            NetworkErrorKind::Tls => "tls failure",
            NetworkErrorKind::Other => "transport failure",
        };
        f.write_str(name)
    }
}

/// Errors returned by `NetService` and `ClientFactory`.
#[derive(Debug, Error)]
pub enum NetError {
    /// The exchange could not complete within the fixed timeouts, or the
    /// connection could not be established at all.
    #[error("network error ({kind}): {message}")]
    Network { kind: NetworkErrorKind, message: String },

    /// The response body was not JSON, or did not match the expected shape.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A request was issued after `NetService::close`.
    #[error("net service used after close")]
    UseAfterClose,

    /// The underlying transport could not be built.
    #[error("client construction failed: {0}")]
    Construction(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The path could not be resolved to an absolute URL, or a caller header
    /// is not a legal header name or value.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl NetError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            NetError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            }
        )
    }

    /// HTTP status for `HttpStatus` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            NetError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return NetError::Decoding(e.to_string());
        }
        if e.is_builder() {
            return NetError::InvalidRequest(e.to_string());
        }
        NetError::Network {
            kind: classify(&e),
            message: describe(&e),
        }
    }
}

/// Walk the source chain looking for a recognisable cause.
fn classify(e: &reqwest::Error) -> NetworkErrorKind {
    if e.is_timeout() {
        return NetworkErrorKind::Timeout;
    }
    let mut source = e.source();
    while let Some(cause) = source {
        if let Some(kind) = classify_cause(cause) {
            return kind;
        }
        source = cause.source();
    }
    NetworkErrorKind::Other
}

fn classify_cause(cause: &(dyn std::error::Error + 'static)) -> Option<NetworkErrorKind> {
    if cause.is::<rustls::Error>() {
        return Some(NetworkErrorKind::Tls);
    }
    if let Some(io) = cause.downcast_ref::<std::io::Error>() {
        // `io::Error::source` skips the wrapped error, so look at it directly.
        if io.get_ref().is_some_and(|inner| inner.is::<rustls::Error>()) {
            return Some(NetworkErrorKind::Tls);
        }
        match io.kind() {
            std::io::ErrorKind::ConnectionRefused => return Some(NetworkErrorKind::ConnectionRefused),
            std::io::ErrorKind::TimedOut => return Some(NetworkErrorKind::Timeout),
            _ => {}
        }
    }
    let text = cause.to_string().to_ascii_lowercase();
    if text.contains("dns error") || text.contains("failed to lookup") || text.contains("name or service not known") {
        return Some(NetworkErrorKind::Dns);
    }
    if ["certificate", "tls", "handshake", "corrupt message"]
        .iter()
        .any(|needle| text.contains(needle))
    {
        return Some(NetworkErrorKind::Tls);
    }
    if text.contains("connection refused") {
        return Some(NetworkErrorKind::ConnectionRefused);
    }
    None
}

/// `reqwest::Error`'s own message hides the root cause; append it.
fn describe(e: &reqwest::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
