//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Sessions and requests stay opaque: C holds a pointer and passes it back.
//! Responses are handed over as plain data (`FfiResponse`) with C strings
//! and a pointer/length pair for the header lines. Conversion lives here so
//! `lib.rs` stays focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use curlex_core::{Request, Response, Session};

/// Opaque handle to a `Session`.
pub struct FfiSession {
    pub(crate) inner: Session,
}

/// Opaque handle to a `Request` under construction.
pub struct FfiRequest {
    pub(crate) inner: Request,
}

impl FfiRequest {
    /// Run one consuming builder step in place.
    pub(crate) fn update(&mut self, step: impl FnOnce(Request) -> Request) {
        let req = std::mem::take(&mut self.inner);
        self.inner = step(req);
    }
}

/// A completed exchange as C-compatible plain data.
///
/// `headers` points to `headers_len` C strings, sorted byte-wise.
/// Release with `curlex_free_response`.
#[repr(C)]
pub struct FfiResponse {
    pub code: u32,
    pub body: *mut c_char,
    pub headers: *mut *mut c_char,
    pub headers_len: u32,
}

impl FfiResponse {
    /// Convert a core `Response` into a heap-allocated `FfiResponse`.
    pub(crate) fn from_core(resp: Response) -> *mut Self {
        let body = c_string(resp.body());

        let headers_len = resp.headers().len() as u32;
        let headers = if resp.headers().is_empty() {
            std::ptr::null_mut()
        } else {
            let lines: Vec<*mut c_char> = resp.headers().iter().map(|h| c_string(h)).collect();
            Box::into_raw(lines.into_boxed_slice()) as *mut *mut c_char
        };

        Box::into_raw(Box::new(FfiResponse {
            code: resp.code(),
            body,
            headers,
            headers_len,
        }))
    }
}

/// Copy `text` into a C string owned by the caller. Interior NULs truncate.
pub(crate) fn c_string(text: &str) -> *mut c_char {
    let bytes = text.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    CString::new(&bytes[..end]).unwrap_or_default().into_raw()
}
