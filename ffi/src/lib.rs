//! C-ABI wrapper around `ondo-core`.
//!
//! # Overview
//! Exposes the Ondo Finance connector through `extern "C"` functions so any
//! language with a C FFI can build requests and map responses into result
//! records without linking to Rust's HTTP stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - The host drives the per-item loop: `ondo_build_request` for item `i`,
//!   execute it, then `ondo_parse_response` or `ondo_error_record`.
//! - A single `FfiResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `ondo_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use ondo_core::{
    ApiError, Credentials, Environment, HttpResponse, JsonParameters, Operation,
    ParameterResolver, Resource, ResultRecord,
};
use serde_json::Value;

use types::*;

/// Read a C string, treating null as absent.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn opt_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        None
    } else {
        unsafe { CStr::from_ptr(ptr) }.to_str().ok()
    }
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `OndoClient`.
///
/// `base_url` may be null or empty: each resource then uses its default
/// host. `environment` may be null (production) or `"production"` /
/// `"sandbox"`.
///
/// Returns null if `api_key` is null or empty, if `environment` is not
/// recognised, or if an internal panic occurs. The caller must free the
/// returned pointer with `ondo_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn ondo_client_new(
    api_key: *const c_char,
    base_url: *const c_char,
    environment: *const c_char,
) -> *mut FfiOndoClient {
    catch_unwind(|| {
        let Some(api_key) = (unsafe { opt_str(api_key) }) else {
            return std::ptr::null_mut();
        };
        let environment = match unsafe { opt_str(environment) } {
            None | Some("") | Some("production") => Environment::Production,
            Some("sandbox") => Environment::Sandbox,
            Some(_) => return std::ptr::null_mut(),
        };
        let credentials = Credentials::new(api_key)
            .with_base_url(unsafe { opt_str(base_url) }.unwrap_or(""))
            .with_environment(environment);
        match credentials.validate() {
            Ok(credentials) => Box::into_raw(Box::new(FfiOndoClient {
                inner: ondo_core::OndoClient::new(credentials),
            })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free an `OndoClient` created by `ondo_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ondo_client_free(client: *mut FfiOndoClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Request building
// ---------------------------------------------------------------------------

/// Resolve parameters for one item and build its request.
fn build_request(
    client: &FfiOndoClient,
    resource: &str,
    operation: &str,
    params: Option<&str>,
    item: usize,
) -> Result<ondo_core::HttpRequest, ApiError> {
    let resource: Resource = resource.parse()?;
    let operation: Operation = operation.parse()?;
    let value: Value = match params {
        None | Some("") => Value::Object(Default::default()),
        Some(raw) => serde_json::from_str(raw).map_err(|e| ApiError::InvalidParameter {
            name: "parameters".to_string(),
            item,
            reason: e.to_string(),
        })?,
    };
    let source = JsonParameters::try_from(value)?;
    let request = ParameterResolver::new(&source, item).resolve(resource, operation)?;
    client.inner.build(&request)
}

/// Build the HTTP request for `operation` on `resource`.
///
/// `params_json` is a JSON object with the item's parameters (null means no
/// parameters); `item` is the input index used in error messages.
///
/// Returns a result with `data_tag = Request` on success. Configuration
/// errors (unsupported resource, unknown operation, missing or invalid
/// parameters) come back as `error_code = Configuration`.
#[unsafe(no_mangle)]
pub extern "C" fn ondo_build_request(
    client: *const FfiOndoClient,
    resource: *const c_char,
    operation: *const c_char,
    params_json: *const c_char,
    item: u32,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        let Some(resource) = (unsafe { opt_str(resource) }) else {
            return FfiResult::null_arg("resource");
        };
        let Some(operation) = (unsafe { opt_str(operation) }) else {
            return FfiResult::null_arg("operation");
        };
        let client = unsafe { &*client };
        let params = unsafe { opt_str(params_json) };
        match build_request(client, resource, operation, params, item as usize) {
            Ok(req) => FfiResult::ok_request(req),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in ondo_build_request"))
}

/// Build the `GET {base}/health` credential test request.
///
/// Returns a result with `data_tag = Request` on success.
#[unsafe(no_mangle)]
pub extern "C" fn ondo_build_health_check(client: *const FfiOndoClient) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        let client = unsafe { &*client };
        FfiResult::ok_request(client.inner.build_health_check())
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in ondo_build_health_check"))
}

// ---------------------------------------------------------------------------
// Response mapping
// ---------------------------------------------------------------------------

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = unsafe { opt_str(resp.body) }.unwrap_or("").to_string();
    HttpResponse::new(resp.status, body)
}

/// Map an executed response into the `{json, pairedItem}` record for `item`.
///
/// Returns a result with `data_tag = Json` on success. Non-2xx responses
/// come back as `NotFound` or `Http` errors with `http_status` set; the
/// host decides whether to abort or call `ondo_error_record`.
#[unsafe(no_mangle)]
pub extern "C" fn ondo_parse_response(
    client: *const FfiOndoClient,
    item: u32,
    response: *const FfiHttpResponse,
) -> *mut FfiResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiResult::null_arg("client");
        }
        if response.is_null() {
            return FfiResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let record = client
            .inner
            .parse(ffi_response_to_core(resp))
            .map(|json| ResultRecord::success(item as usize, json))
            .and_then(|record| {
                serde_json::to_string(&record)
                    .map_err(|e| ApiError::Serialization(e.to_string()))
            });
        match record {
            Ok(json) => FfiResult::ok_json(json),
            Err(e) => FfiResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiResult::panic("panic in ondo_parse_response"))
}

/// Build the `{json: {error}, pairedItem}` record used when a failed item is
/// tolerated.
///
/// Returns null if `message` is null. Free with `ondo_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn ondo_error_record(item: u32, message: *const c_char) -> *mut c_char {
    catch_unwind(|| {
        let Some(message) = (unsafe { opt_str(message) }) else {
            return std::ptr::null_mut();
        };
        match serde_json::to_string(&ResultRecord::error(item as usize, message)) {
            Ok(json) => to_c_string(json),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

fn free_request(req: Box<FfiHttpRequest>) {
    if !req.url.is_null() {
        drop(unsafe { CString::from_raw(req.url) });
    }
    if !req.body.is_null() {
        drop(unsafe { CString::from_raw(req.body) });
    }
    if !req.headers.is_null() && req.headers_len > 0 {
        let headers: Box<[FfiHeader]> = unsafe {
            Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                req.headers,
                req.headers_len as usize,
            ))
        };
        for h in headers.iter() {
            if !h.key.is_null() {
                drop(unsafe { CString::from_raw(h.key) });
            }
            if !h.value.is_null() {
                drop(unsafe { CString::from_raw(h.value) });
            }
        }
    }
}

/// Free an `FfiResult` returned by any `ondo_build_*` or `ondo_parse_*`
/// function. Safe to call with null. Uses `data_tag` to determine what
/// `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn ondo_free_result(result: *mut FfiResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        if !result.error_message.is_null() {
            drop(unsafe { CString::from_raw(result.error_message) });
        }
        if !result.data.is_null() {
            match result.data_tag {
                FfiDataTag::Request => {
                    free_request(unsafe { Box::from_raw(result.data as *mut FfiHttpRequest) });
                }
                FfiDataTag::Json => {
                    drop(unsafe { CString::from_raw(result.data as *mut c_char) });
                }
                FfiDataTag::None => {}
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn ondo_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
