//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Payloads cross the boundary as JSON C strings, so the C side never needs
//! per-type structs. A single `FfiNetResult` envelope carries either the
//! response JSON or an error code plus message. Conversion helpers live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use net_core::{NetError, NetService, NetworkErrorKind};

/// Opaque handle to a `NetService` plus the runtime that drives it. C
/// callers receive a pointer to this and pass it back into every call.
pub struct FfiNetService {
    pub(crate) runtime: tokio::runtime::Runtime,
    pub(crate) inner: NetService,
}

/// Error codes returned in `FfiNetResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Network = 1,
    Timeout = 2,
    Decoding = 3,
    HttpStatus = 4,
    UseAfterClose = 5,
    Construction = 6,
    Serialization = 7,
    InvalidRequest = 8,
    InvalidArgument = 9,
    NullArg = 10,
    Panic = 11,
}

/// Result envelope for every request call.
///
/// On success `error_code` is `Ok`, `error_message` is null and `body` holds
/// the response JSON. On failure `body` is null, `error_message` is a
/// human-readable C string and `http_status` is set for `HttpStatus` errors.
/// For `HttpStatus` the raw response body is also returned in `body`.
#[repr(C)]
pub struct FfiNetResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub body: *mut c_char,
}

impl FfiNetResult {
    pub(crate) fn ok(json: String) -> *mut Self {
        Box::into_raw(Box::new(FfiNetResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            body: to_c_string(json),
        }))
    }

    pub(crate) fn from_error(err: NetError) -> *mut Self {
        let message = err.to_string();
        let (error_code, http_status, body) = match err {
            NetError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            } => (FfiErrorCode::Timeout, 0, std::ptr::null_mut()),
            NetError::Network { .. } => (FfiErrorCode::Network, 0, std::ptr::null_mut()),
            NetError::Decoding(_) => (FfiErrorCode::Decoding, 0, std::ptr::null_mut()),
            NetError::HttpStatus { status, body } => (FfiErrorCode::HttpStatus, status, to_c_string(body)),
            NetError::UseAfterClose => (FfiErrorCode::UseAfterClose, 0, std::ptr::null_mut()),
            NetError::Construction(_) => (FfiErrorCode::Construction, 0, std::ptr::null_mut()),
            NetError::Serialization(_) => (FfiErrorCode::Serialization, 0, std::ptr::null_mut()),
            NetError::InvalidRequest(_) => (FfiErrorCode::InvalidRequest, 0, std::ptr::null_mut()),
        };
        Box::into_raw(Box::new(FfiNetResult {
            error_code,
            error_message: to_c_string(message),
            http_status,
            body,
        }))
    }

    pub(crate) fn invalid_argument(msg: String) -> *mut Self {
        Self::failure(FfiErrorCode::InvalidArgument, &msg)
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, &format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg)
    }

    fn failure(error_code: FfiErrorCode, msg: &str) -> *mut Self {
        Box::into_raw(Box::new(FfiNetResult {
            error_code,
            error_message: to_c_string(msg.to_string()),
            http_status: 0,
            body: std::ptr::null_mut(),
        }))
    }
}

/// Interior NULs cannot be represented; they are stripped.
pub(crate) fn to_c_string(s: String) -> *mut c_char {
    let s = match CString::new(s) {
        Ok(c) => c,
        Err(e) => {
            let mut bytes = e.into_vec();
            bytes.retain(|b| *b != 0);
            CString::new(bytes).unwrap_or_default()
        }
    };
    s.into_raw()
}
