//! Blocking transfer session over one reusable engine handle.
//!
//! # Design
//! A `Session` owns exactly one handle. Every verb call follows the same
//! sequence under a `ResetGuard`:
//!
//! 1. re-apply the session config and prime the collector,
//! 2. attach the header list, method, URL and (for POST) the upload size,
//! 3. run the blocking transfer and read back the status code,
//! 4. move the collected buffers into a `Response`.
//!
//! The first failing step ends the call. Dropping the guard resets the
//! handle on every path, which also releases the header list, so a failed
//! call leaves nothing behind for the next one.
//!
//! Calls take `&mut self`: one in-flight call per session. For concurrent
//! use, clone the session and move the clone to another thread.

use std::fmt;

use curl::easy::{Easy2, List};
use uuid::Uuid;

use crate::collector::Collector;
use crate::config::SessionConfig;
use crate::error::Error;
use crate::guard::ResetGuard;
use crate::info::VersionInfo;
use crate::request::Request;
use crate::response::Response;

/// HTTP methods a session can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Options,
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Options => "OPTIONS",
        })
    }
}

#[derive(Debug)]
pub struct Session {
    handle: Easy2<Collector>,
    config: SessionConfig,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Session {
    /// A new session on its own handle, carrying this session's config.
    fn clone(&self) -> Self {
        Self::with_config(self.config.clone())
    }
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        // Process-wide engine setup; runs once no matter how many sessions.
        curl::init();
        Self {
            handle: Easy2::new(Collector::default()),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Engine version string, e.g. `8.5.0`.
    pub fn version(&self) -> String {
        curl::Version::get().version().to_string()
    }

    pub fn info(&self) -> VersionInfo {
        VersionInfo::new()
    }

    pub fn get(&mut self, req: &Request) -> Option<Response> {
        self.call(Verb::Get, req)
    }

    pub fn post(&mut self, req: &Request) -> Option<Response> {
        self.call(Verb::Post, req)
    }

    pub fn options(&mut self, req: &Request) -> Option<Response> {
        self.call(Verb::Options, req)
    }

    fn call(&mut self, verb: Verb, req: &Request) -> Option<Response> {
        match self.perform(verb, req) {
            Ok(response) => Some(response),
            Err(e) => {
                tracing::error!("{verb}: {e}");
                None
            }
        }
    }

    /// Execute `verb` against the URL cached in `req` by `Request::build`.
    pub fn perform(&mut self, verb: Verb, req: &Request) -> Result<Response, Error> {
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("transfer", %verb, url = req.url(), %request_id);
        let _entered = span.enter();

        let mut handle = ResetGuard::new(&mut self.handle);

        let upload = match verb {
            Verb::Post => req.upload_bytes().to_vec(),
            Verb::Get | Verb::Options => Vec::new(),
        };
        let upload_len = upload.len() as u64;
        handle.get_mut().prepare(upload);

        self.config.apply(&mut handle).map_err(Error::Configure)?;

        if !req.headers().is_empty() {
            handle
                .http_headers(header_list(req.headers())?)
                .map_err(Error::Configure)?;
        }

        let method = match verb {
            Verb::Get => handle.get(true),
            Verb::Post => handle.post(true),
            Verb::Options => handle.custom_request("OPTIONS"),
        };
        method.map_err(Error::Configure)?;

        handle.url(req.url()).map_err(Error::Configure)?;

        if verb == Verb::Post {
            handle.post_field_size(upload_len).map_err(Error::Configure)?;
        }

        if req.is_verbose() {
            handle.verbose(true).map_err(Error::Configure)?;
        }

        handle.perform().map_err(Error::Perform)?;
        let code = handle.response_code().map_err(Error::ResponseCode)?;

        let body = handle.get_mut().take_body();
        let headers = handle.get_mut().take_headers();
        tracing::debug!(code, bytes = body.len(), "transfer complete");

        Ok(Response::new(code, body, &headers))
    }
}

/// One `Key:Value` line per header, in insertion order.
fn header_list(headers: &[(String, String)]) -> Result<List, Error> {
    let mut list = List::new();
    for (k, v) in headers {
        list.append(&format!("{k}:{v}")).map_err(Error::Configure)?;
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_request() -> Request {
        Request::new()
            .scheme("http")
            .host("127.0.0.1:1")
            .endpoint("nothing")
            .add_header("X-Trace", "1")
            .build()
    }

    #[test]
    fn verb_display() {
        assert_eq!(Verb::Get.to_string(), "GET");
        assert_eq!(Verb::Post.to_string(), "POST");
        assert_eq!(Verb::Options.to_string(), "OPTIONS");
    }

    #[test]
    fn failed_transfer_yields_none() {
        let mut session = Session::new();
        let req = unreachable_request();
        assert!(session.get(&req).is_none());
        assert!(session.options(&req).is_none());
        assert!(session.post(&req.clone().data("payload")).is_none());
    }

    #[test]
    fn failed_transfer_reports_perform_error() {
        let mut session = Session::new();
        let err = session.perform(Verb::Get, &unreachable_request()).unwrap_err();
        assert!(matches!(err, Error::Perform(_)));
        assert!(err.engine_error().unwrap().is_couldnt_connect());
    }

    #[test]
    fn repeated_failures_leave_session_usable() {
        let mut session = Session::new();
        let req = unreachable_request();
        for _ in 0..50 {
            assert!(session.get(&req).is_none());
        }
        assert!(session.handle.get_mut().take_body().is_empty());
    }

    #[test]
    fn unbuilt_request_fails() {
        let mut session = Session::new();
        let req = Request::new().host("127.0.0.1:1");
        assert!(session.get(&req).is_none());
    }

    #[test]
    fn clone_keeps_config() {
        let config = SessionConfig {
            timeout_ms: Some(500),
            ..SessionConfig::default()
        };
        let session = Session::with_config(config.clone());
        let copy = session.clone();
        assert_eq!(copy.config(), &config);
    }

    #[test]
    fn version_matches_info() {
        let session = Session::new();
        assert_eq!(session.version(), session.info().version());
    }

    #[test]
    fn header_list_builds_from_pairs() {
        let headers = vec![
            ("Accept".to_string(), "text/plain".to_string()),
            ("X-Count".to_string(), "3".to_string()),
        ];
        let list = header_list(&headers).unwrap();
        let lines: Vec<&[u8]> = list.iter().collect();
        assert_eq!(lines, [&b"Accept:text/plain"[..], &b"X-Count:3"[..]]);
    }
}
