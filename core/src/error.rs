//! Error types for the transfer session.
//!
//! # Design
//! Variants follow the stage of a call that failed. The verb methods on
//! `Session` log these and collapse them to `None`; `Session::perform`
//! hands them to callers that want the detail.

use thiserror::Error;

/// Errors produced while configuring or running a transfer.
#[derive(Debug, Error)]
pub enum Error {
    /// An option could not be set on the handle.
    #[error("{0}")]
    Configure(#[source] curl::Error),

    /// The blocking transfer itself failed (connect, protocol, timeout).
    #[error("{0}")]
    Perform(#[source] curl::Error),

    /// The status code could not be read back after the transfer.
    #[error("{0}")]
    ResponseCode(#[source] curl::Error),

    /// Session configuration text could not be parsed.
    #[error("invalid session config: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// The engine's error description, if the failure came from the engine.
    pub fn engine_error(&self) -> Option<&curl::Error> {
        match self {
            Error::Configure(e) | Error::Perform(e) | Error::ResponseCode(e) => Some(e),
            Error::Config(_) => None,
        }
    }
}
