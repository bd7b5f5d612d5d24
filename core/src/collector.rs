//! Callback side of a transfer: where received bytes land and where
//! uploaded bytes come from.
//!
//! # Design
//! The engine owns the `Collector` for the lifetime of the handle and calls
//! into it while `perform()` runs. Buffers are plain owned `Vec<u8>`s; the
//! session takes them out with `take_*` once the call finishes, so no
//! reference to them outlives the call and the next call starts empty.

use curl::easy::{Handler, InfoType, ReadError, WriteError};

/// Outgoing payload with a cursor over the bytes still to send.
#[derive(Debug, Default)]
pub(crate) struct Upload {
    data: Vec<u8>,
    offset: usize,
}

impl Upload {
    pub(crate) fn new(data: Vec<u8>) -> Self {
        Self { data, offset: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Copy the next `min(remaining, dst.len())` bytes into `dst`.
    /// Returns 0 once everything has been handed out.
    pub(crate) fn fill(&mut self, dst: &mut [u8]) -> usize {
        let n = self.remaining().min(dst.len());
        dst[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
        self.offset += n;
        n
    }
}

/// Per-handle callback state.
#[derive(Debug, Default)]
pub(crate) struct Collector {
    body: Vec<u8>,
    headers: Vec<u8>,
    upload: Upload,
}

impl Collector {
    /// Start a call: empty receive buffers, fresh upload cursor.
    pub(crate) fn prepare(&mut self, upload: Vec<u8>) {
        self.body.clear();
        self.headers.clear();
        self.upload = Upload::new(upload);
    }

    pub(crate) fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.body)
    }

    pub(crate) fn take_headers(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.headers)
    }

    /// Drop everything left over from a call, including unsent upload bytes.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Handler for Collector {
    fn write(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        self.body.extend_from_slice(data);
        Ok(data.len())
    }

    fn header(&mut self, data: &[u8]) -> bool {
        self.headers.extend_from_slice(data);
        true
    }

    fn read(&mut self, data: &mut [u8]) -> Result<usize, ReadError> {
        Ok(self.upload.fill(data))
    }

    fn debug(&mut self, kind: InfoType, data: &[u8]) {
        match kind {
            InfoType::Text => {
                tracing::debug!(target: "curlex::wire", "* {}", String::from_utf8_lossy(data).trim_end())
            }
            InfoType::HeaderIn => {
                tracing::debug!(target: "curlex::wire", "< {}", String::from_utf8_lossy(data).trim_end())
            }
            InfoType::HeaderOut => {
                tracing::debug!(target: "curlex::wire", "> {}", String::from_utf8_lossy(data).trim_end())
            }
            InfoType::DataIn => tracing::trace!(target: "curlex::wire", bytes = data.len(), "data in"),
            InfoType::DataOut => tracing::trace!(target: "curlex::wire", bytes = data.len(), "data out"),
            _ => {}
        }
    }
}
