//! C-ABI wrapper around `net-core` for the Android and iOS hosts.
//!
//! # Overview
//! Exposes the environment base URL, service lifecycle and JSON GET/POST
//! through `extern "C"` functions. The JNI shim on Android and the Swift
//! wrapper on iOS call these from a background thread; each call blocks until
//! the exchange completes or times out.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Each service handle owns a small tokio runtime that drives its requests.
//! - Payloads, query maps and header maps are JSON C strings. Query values
//!   that are JSON `null` are dropped before the request is built.
//! - The C caller owns all returned pointers and must call the matching
//!   `net_free_*` / `net_service_free` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use net_core::{ClientConfig, EnvironmentConfig, NetService, RequestOptions};
use serde_json::Value;

use types::*;

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Set the process-wide default base URL. Null clears it.
///
/// Only services created afterwards see the new value.
#[unsafe(no_mangle)]
pub extern "C" fn net_env_set_base_url(base_url: *const c_char) {
    let _ = catch_unwind(|| {
        let value = unsafe { opt_str(base_url) }.map(str::to_string);
        EnvironmentConfig::set_base_url(value);
    });
}

/// Current process-wide base URL, or null when unset.
///
/// The caller must free a non-null result with `net_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn net_env_base_url() -> *mut c_char {
    catch_unwind(|| match EnvironmentConfig::base_url() {
        Some(url) => to_c_string(url),
        None => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Service lifecycle
// ---------------------------------------------------------------------------

/// Create a `NetService`. A null `base_url` uses the environment base URL.
///
/// Returns null if the transport or runtime cannot be built.
/// The caller must free the returned pointer with `net_service_free`.
#[unsafe(no_mangle)]
pub extern "C" fn net_service_new(base_url: *const c_char) -> *mut FfiNetService {
    catch_unwind(|| {
        let config = match unsafe { opt_str(base_url) } {
            Some(url) => ClientConfig::new(Some(url)),
            None => ClientConfig::from_env_config(),
        };
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("net-ffi")
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                tracing::error!(error = %e, "failed to start net runtime");
                return std::ptr::null_mut();
            }
        };
        let inner = match NetService::from_config(config) {
            Ok(svc) => svc,
            Err(e) => {
                tracing::error!(error = %e, "failed to build net service");
                return std::ptr::null_mut();
            }
        };
        Box::into_raw(Box::new(FfiNetService { runtime, inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Release the service's client. Returns true only on the first call.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn net_service_close(service: *const FfiNetService) -> bool {
    if service.is_null() {
        return false;
    }
    catch_unwind(AssertUnwindSafe(|| unsafe { &*service }.inner.close())).unwrap_or(false)
}

/// Free a service created by `net_service_new`. Closes it first if needed.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn net_service_free(service: *mut FfiNetService) {
    if !service.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let service = unsafe { Box::from_raw(service) };
            service.inner.close();
            service.runtime.shutdown_background();
        }));
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// GET `path`. `query_json` is a JSON object of scalar-or-null values and
/// `headers_json` a JSON object of strings; both may be null.
///
/// Returns a result whose `body` is the response JSON on success.
#[unsafe(no_mangle)]
pub extern "C" fn net_service_get_json(
    service: *const FfiNetService,
    path: *const c_char,
    query_json: *const c_char,
    headers_json: *const c_char,
) -> *mut FfiNetResult {
    catch_unwind(AssertUnwindSafe(|| {
        if service.is_null() {
            return FfiNetResult::null_arg("service");
        }
        let Some(path) = (unsafe { opt_str(path) }) else {
            return FfiNetResult::null_arg("path");
        };
        let service = unsafe { &*service };
        let options = match unsafe { request_options(query_json, headers_json) } {
            Ok(options) => options,
            Err(msg) => return FfiNetResult::invalid_argument(msg),
        };
        let result = service
            .runtime
            .block_on(service.inner.get_async::<Value>(path, options));
        match result {
            Ok(value) => FfiNetResult::ok(value.to_string()),
            Err(e) => FfiNetResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiNetResult::panic("panic in net_service_get_json"))
}

/// POST `body_json` to `path`. Query and header arguments as for
/// `net_service_get_json`.
#[unsafe(no_mangle)]
pub extern "C" fn net_service_post_json(
    service: *const FfiNetService,
    path: *const c_char,
    body_json: *const c_char,
    query_json: *const c_char,
    headers_json: *const c_char,
) -> *mut FfiNetResult {
    catch_unwind(AssertUnwindSafe(|| {
        if service.is_null() {
            return FfiNetResult::null_arg("service");
        }
        let Some(path) = (unsafe { opt_str(path) }) else {
            return FfiNetResult::null_arg("path");
        };
        let Some(body) = (unsafe { opt_str(body_json) }) else {
            return FfiNetResult::null_arg("body_json");
        };
        let body: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => return FfiNetResult::invalid_argument(format!("body_json: {e}")),
        };
        let service = unsafe { &*service };
        let options = match unsafe { request_options(query_json, headers_json) } {
            Ok(options) => options,
            Err(msg) => return FfiNetResult::invalid_argument(msg),
        };
        let result = service
            .runtime
            .block_on(service.inner.post_async::<Value, Value>(path, &body, options));
        match result {
            Ok(value) => FfiNetResult::ok(value.to_string()),
            Err(e) => FfiNetResult::from_error(e),
        }
    }))
    .unwrap_or_else(|_| FfiNetResult::panic("panic in net_service_post_json"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiNetResult` returned by any request function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn net_free_result(result: *mut FfiNetResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        net_free_string(result.error_message);
        net_free_string(result.body);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn net_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { std::ffi::CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Borrow a C string as UTF-8. Null or invalid UTF-8 yields `None`.
unsafe fn opt_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Build `RequestOptions` from the optional query and header JSON objects.
unsafe fn request_options(query_json: *const c_char, headers_json: *const c_char) -> Result<RequestOptions, String> {
    let mut options = RequestOptions::new();
    if let Some(raw) = unsafe { opt_str(query_json) } {
        let pairs = json_object(raw, "query_json")?;
        options = options.queries(pairs.into_iter().map(|(k, v)| (k, scalar_text(v))));
    }
    if let Some(raw) = unsafe { opt_str(headers_json) } {
        let pairs = json_object(raw, "headers_json")?;
        for (name, value) in pairs {
            match scalar_text(value) {
                Some(value) => options = options.header(name, value),
                None => return Err(format!("headers_json: `{name}` is null")),
            }
        }
    }
    Ok(options)
}

fn json_object(raw: &str, what: &str) -> Result<serde_json::Map<String, Value>, String> {
    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(format!("{what}: expected a JSON object")),
        Err(e) => Err(format!("{what}: {e}")),
    }
}

/// Strings pass through unquoted; other scalars use their JSON text.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
