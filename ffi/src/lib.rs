//! C-ABI wrapper around `curlex-core`.
//!
//! # Overview
//! Exposes sessions, the request builder and the GET/POST/OPTIONS verbs
//! through `extern "C"` functions so any language with a C FFI can run
//! transfers without touching Rust types.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Builder setters return `false` on a null or non-UTF-8 argument and
//!   leave the request untouched.
//! - A verb returns null when no response was produced, mirroring the
//!   core's `Option<Response>`.
//! - The C caller owns all returned pointers and must call the matching
//!   `curlex_*_free` / `curlex_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use curlex_core::{Request, Session, VersionInfo};

use types::*;

/// Borrow a C string as `&str`; `None` for null or invalid UTF-8.
fn as_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Apply one builder step to `req`. Returns `false` if `req` is null.
fn with_request(req: *mut FfiRequest, step: impl FnOnce(Request) -> Request) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if req.is_null() {
            return false;
        }
        let req = unsafe { &mut *req };
        req.update(step);
        true
    }))
    .unwrap_or(false)
}

/// Apply a builder step that takes one text argument.
fn with_text(
    req: *mut FfiRequest,
    text: *const c_char,
    step: impl FnOnce(Request, &str) -> Request,
) -> bool {
    match as_str(text) {
        Some(text) => with_request(req, |r| step(r, text)),
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

/// Create a session with its own transfer handle.
///
/// The caller must free the returned pointer with `curlex_session_free`.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_session_new() -> *mut FfiSession {
    catch_unwind(|| Box::into_raw(Box::new(FfiSession { inner: Session::new() })))
        .unwrap_or(std::ptr::null_mut())
}

/// Create an independent session carrying `session`'s configuration.
///
/// Returns null if `session` is null.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_session_clone(session: *const FfiSession) -> *mut FfiSession {
    catch_unwind(AssertUnwindSafe(|| {
        if session.is_null() {
            return std::ptr::null_mut();
        }
        let session = unsafe { &*session };
        Box::into_raw(Box::new(FfiSession {
            inner: session.inner.clone(),
        }))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Free a session. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_session_free(session: *mut FfiSession) {
    if !session.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(session) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Request builder
// ---------------------------------------------------------------------------

/// Create an empty request (scheme `https`).
///
/// The caller must free the returned pointer with `curlex_request_free`.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_new() -> *mut FfiRequest {
    catch_unwind(|| Box::into_raw(Box::new(FfiRequest { inner: Request::new() })))
        .unwrap_or(std::ptr::null_mut())
}

/// Free a request. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_free(req: *mut FfiRequest) {
    if !req.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(req) });
        });
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_scheme(req: *mut FfiRequest, text: *const c_char) -> bool {
    with_text(req, text, |r, t| r.scheme(t))
}

#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_host(req: *mut FfiRequest, text: *const c_char) -> bool {
    with_text(req, text, |r, t| r.host(t))
}

#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_endpoint(req: *mut FfiRequest, text: *const c_char) -> bool {
    with_text(req, text, |r, t| r.endpoint(t))
}

/// Set the payload a POST streams out.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_data(req: *mut FfiRequest, text: *const c_char) -> bool {
    with_text(req, text, |r, t| r.data(t))
}

#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_body(req: *mut FfiRequest, text: *const c_char) -> bool {
    with_text(req, text, |r, t| r.body(t))
}

/// Add a text query parameter. A repeated key is ignored (returns `true`).
#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_add_param(
    req: *mut FfiRequest,
    key: *const c_char,
    value: *const c_char,
) -> bool {
    match (as_str(key), as_str(value)) {
        (Some(k), Some(v)) => with_request(req, |r| r.add_param(k, v)),
        _ => false,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_add_param_int(
    req: *mut FfiRequest,
    key: *const c_char,
    value: i64,
) -> bool {
    with_text(req, key, |r, k| r.add_param(k, value))
}

#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_add_param_float(
    req: *mut FfiRequest,
    key: *const c_char,
    value: f64,
) -> bool {
    with_text(req, key, |r, k| r.add_param(k, value))
}

/// Add a request header. A repeated key is ignored (returns `true`).
#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_add_header(
    req: *mut FfiRequest,
    key: *const c_char,
    value: *const c_char,
) -> bool {
    match (as_str(key), as_str(value)) {
        (Some(k), Some(v)) => with_request(req, |r| r.add_header(k, v)),
        _ => false,
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_verbose(req: *mut FfiRequest) -> bool {
    with_request(req, Request::verbose)
}

#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_reset_params(req: *mut FfiRequest) -> bool {
    with_request(req, Request::reset_params)
}

#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_build(req: *mut FfiRequest) -> bool {
    with_request(req, Request::build)
}

/// The URL rendered by the last build, empty before that.
///
/// Returns null if `req` is null. Free with `curlex_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_request_url(req: *const FfiRequest) -> *mut c_char {
    catch_unwind(|| {
        if req.is_null() {
            return std::ptr::null_mut();
        }
        let req = unsafe { &*req };
        c_string(req.inner.url())
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

fn run_verb(
    session: *mut FfiSession,
    req: *const FfiRequest,
    verb: fn(&mut Session, &Request) -> Option<curlex_core::Response>,
) -> *mut FfiResponse {
    catch_unwind(AssertUnwindSafe(|| {
        if session.is_null() || req.is_null() {
            return std::ptr::null_mut();
        }
        let session = unsafe { &mut *session };
        let req = unsafe { &*req };
        match verb(&mut session.inner, &req.inner) {
            Some(resp) => FfiResponse::from_core(resp),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or_else(|_| {
        tracing::error!("panic during transfer");
        std::ptr::null_mut()
    })
}

/// Execute a GET. Returns null if no response was produced.
///
/// Free the result with `curlex_free_response`.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_get(session: *mut FfiSession, req: *const FfiRequest) -> *mut FfiResponse {
    run_verb(session, req, Session::get)
}

/// Execute a POST, streaming the request's data. Returns null if no response
/// was produced.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_post(session: *mut FfiSession, req: *const FfiRequest) -> *mut FfiResponse {
    run_verb(session, req, Session::post)
}

/// Execute an OPTIONS. Returns null if no response was produced.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_options(
    session: *mut FfiSession,
    req: *const FfiRequest,
) -> *mut FfiResponse {
    run_verb(session, req, Session::options)
}

// ---------------------------------------------------------------------------
// Version info
// ---------------------------------------------------------------------------

/// Engine version string. Free with `curlex_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_version() -> *mut c_char {
    catch_unwind(|| c_string(VersionInfo::new().version())).unwrap_or(std::ptr::null_mut())
}

/// Engine capability snapshot as pretty-printed JSON. Free with
/// `curlex_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_info_json() -> *mut c_char {
    catch_unwind(|| c_string(&VersionInfo::new().as_json())).unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiResponse` returned by a verb. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_free_response(resp: *mut FfiResponse) {
    if resp.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let resp = unsafe { Box::from_raw(resp) };
        if !resp.body.is_null() {
            drop(unsafe { CString::from_raw(resp.body) });
        }
        if !resp.headers.is_null() && resp.headers_len > 0 {
            let lines = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    resp.headers,
                    resp.headers_len as usize,
                ))
            };
            for line in lines.iter() {
                if !line.is_null() {
                    drop(unsafe { CString::from_raw(*line) });
                }
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn curlex_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { CString::from_raw(s) });
        });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
