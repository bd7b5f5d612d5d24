//! Blocking HTTP request builder and transfer session over libcurl.
//!
//! # Overview
//! Build a `Request` fluently, call `build()` to render its URL, then hand it
//! to a `Session` verb (`get`, `post`, `options`). A completed exchange
//! yields a `Response` with the status code, body text and sorted header
//! lines; any failure is logged and yields `None`.
//!
//! # Design
//! - `Session` owns one libcurl easy handle and reuses it across calls. A
//!   reset guard restores the handle after every call, so options never
//!   bleed from one request into the next.
//! - Received bytes land in owned buffers inside the handle's callback
//!   state and are moved into the `Response` when the call completes.
//! - `Request` caches its URL at `build()` time; only `reset_params()`
//!   invalidates it.
//! - Diagnostics go through `tracing`; install a subscriber to see them.

mod collector;
pub mod config;
pub mod error;
mod guard;
pub mod info;
pub mod request;
pub mod response;
pub mod session;

pub use config::SessionConfig;
pub use error::Error;
pub use info::VersionInfo;
pub use request::{ParamValue, Request};
pub use response::Response;
pub use session::{Session, Verb};
