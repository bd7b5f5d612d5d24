//! Persistent per-session transfer options.
//!
//! These are the only options that survive between calls: the reset guard
//! wipes the handle after every call and the session re-applies this config
//! at the start of the next one. Clones of a session carry the same config.

use std::time::Duration;

use curl::easy::Easy2;
use serde::{Deserialize, Serialize};

use crate::collector::Collector;
use crate::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound on connection setup, in milliseconds.
    pub connect_timeout_ms: Option<u64>,

    /// Upper bound on the whole exchange, in milliseconds.
    pub timeout_ms: Option<u64>,

    pub user_agent: Option<String>,

    /// Follow `Location` redirects.
    pub follow_redirects: bool,
}

impl SessionConfig {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    pub(crate) fn apply(&self, handle: &mut Easy2<Collector>) -> Result<(), curl::Error> {
        if let Some(ms) = self.connect_timeout_ms {
            handle.connect_timeout(Duration::from_millis(ms))?;
        }
        if let Some(ms) = self.timeout_ms {
            handle.timeout(Duration::from_millis(ms))?;
        }
        if let Some(agent) = &self.user_agent {
            handle.useragent(agent)?;
        }
        if self.follow_redirects {
            handle.follow_location(true)?;
        }
        Ok(())
    }
}
