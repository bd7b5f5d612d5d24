//! Immutable result of a completed transfer.
//!
//! # Design
//! Header bytes arrive from the engine exactly as sent on the wire. They
//! are canonicalized once, at construction: split into lines, trimmed,
//! reduced to the lines that carry a colon (the status line and the blank
//! terminator fall out), then sorted byte-wise. Sorting makes the list
//! independent of server header order, so callers can compare it directly.

/// Status code, body and canonical header lines of one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    code: u32,
    body: String,
    headers: Vec<String>,
}

impl Response {
    pub fn new(code: u32, body: Vec<u8>, raw_headers: &[u8]) -> Self {
        let body = match String::from_utf8(body) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        };
        Self {
            code,
            body,
            headers: canonical_headers(raw_headers),
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Header lines, `Key: Value` shaped, sorted byte-wise.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Value of the first header whose name matches `name` ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

fn canonical_headers(raw: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(raw);
    let mut lines: Vec<String> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| line.contains(':'))
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}
