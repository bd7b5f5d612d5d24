//! Scope guard that returns a transfer handle to its default state.
//!
//! Every verb call on a `Session` runs with one of these alive. However the
//! call ends, dropping the guard resets all per-call options, releases the
//! attached header list and empties the callback buffers, so nothing set up
//! for one request can leak into the next one on the same handle.

use std::ops::{Deref, DerefMut};

use curl::easy::{Easy2, List};

use crate::collector::Collector;

pub(crate) struct ResetGuard<'a> {
    handle: &'a mut Easy2<Collector>,
}

impl<'a> ResetGuard<'a> {
    pub(crate) fn new(handle: &'a mut Easy2<Collector>) -> Self {
        Self { handle }
    }
}

impl Deref for ResetGuard<'_> {
    type Target = Easy2<Collector>;

    fn deref(&self) -> &Self::Target {
        self.handle
    }
}

impl DerefMut for ResetGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.handle
    }
}

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        self.handle.reset();
        // The reset detaches the header list; replacing it frees it now.
        if let Err(e) = self.handle.http_headers(List::new()) {
            tracing::warn!(error = %e, "failed to release header list");
        }
        self.handle.get_mut().clear();
    }
}
