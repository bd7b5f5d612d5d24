//! Fluent builder for outgoing HTTP requests.
//!
//! # Design
//! `Request` accumulates scheme, host, endpoint, query parameters, headers
//! and payload, then renders the final URL once in `build()`. The rendered
//! URL is cached: later mutations of scheme, host, endpoint or headers do
//! not touch it. Only `reset_params()` clears it, which forces another
//! `build()` before the request is usable again.
//!
//! Parameter and header keys are unique. A repeated key is rejected with a
//! warning and the existing entry is kept; the builder chain carries on.

use std::fmt;

/// Ordered key/value pairs with unique keys.
pub type KeyValueVec = Vec<(String, String)>;

/// A parameter or header value before it is rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Float(f64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Text(text) => f.write_str(text),
            ParamValue::Int(n) => write!(f, "{n}"),
            ParamValue::Float(x) if x.is_nan() => f.write_str("nan"),
            // Fixed notation, six fractional digits.
            ParamValue::Float(x) => write!(f, "{x:.6}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Text(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::Int(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(f64::from(value))
    }
}

/// An HTTP request under construction.
///
/// ```
/// use curlex_core::Request;
///
/// let req = Request::new()
///     .host("example.com")
///     .endpoint("v1/items")
///     .add_param("limit", 10)
///     .build();
/// assert_eq!(req.url(), "https://example.com/v1/items?limit=10");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    scheme: String,
    host: String,
    endpoint: String,
    data: String,
    params: KeyValueVec,
    body: String,
    headers: KeyValueVec,
    verbose: bool,
    url: String,
}

impl Default for Request {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            host: String::new(),
            endpoint: String::new(),
            data: String::new(),
            params: Vec::new(),
            body: String::new(),
            headers: Vec::new(),
            verbose: false,
            url: String::new(),
        }
    }
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheme(mut self, text: &str) -> Self {
        self.scheme = text.to_string();
        self
    }

    pub fn host(mut self, text: &str) -> Self {
        self.host = text.to_string();
        self
    }

    pub fn endpoint(mut self, text: &str) -> Self {
        self.endpoint = text.to_string();
        self
    }

    /// Set the payload streamed out by a POST.
    pub fn data(mut self, text: &str) -> Self {
        self.data = text.to_string();
        self
    }

    pub fn body(mut self, text: &str) -> Self {
        self.body = text.to_string();
        self
    }

    /// Append a query parameter. Empty keys are ignored and repeated keys
    /// are rejected without replacing the first value.
    pub fn add_param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        if insert_unique(&mut self.params, key, value.into()) == Insert::Duplicate {
            tracing::warn!(key, "repeated parameter key not accepted");
        }
        self
    }

    /// Append a request header. Same key rules as `add_param`.
    pub fn add_header(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        if insert_unique(&mut self.headers, key, value.into()) == Insert::Duplicate {
            tracing::warn!(key, "repeated header key not accepted");
        }
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Drop all parameters and the cached URL.
    pub fn reset_params(mut self) -> Self {
        self.params.clear();
        self.url.clear();
        self
    }

    /// Render `scheme://host/endpoint?k1=v1&k2=v2` into the cached URL.
    pub fn build(mut self) -> Self {
        let mut url = format!("{}://{}/{}", self.scheme, self.host, self.endpoint);
        for (i, (k, v)) in self.params.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            url.push(sep);
            url.push_str(k);
            url.push('=');
            url.push_str(v);
        }
        self.url = url;
        self
    }

    /// The URL rendered by the last `build()`, empty before that.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn payload(&self) -> &str {
        &self.data
    }

    pub fn body_text(&self) -> &str {
        &self.body
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Bytes uploaded by a POST: `data` when set, otherwise `body`.
    pub fn upload_bytes(&self) -> &[u8] {
        if self.data.is_empty() {
            self.body.as_bytes()
        } else {
            self.data.as_bytes()
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Insert {
    Added,
    Skipped,
    Duplicate,
}

fn insert_unique(vec: &mut KeyValueVec, key: &str, value: ParamValue) -> Insert {
    if key.is_empty() {
        return Insert::Skipped;
    }
    if vec.iter().any(|(k, _)| k == key) {
        return Insert::Duplicate;
    }
    vec.push((key.to_string(), value.to_string()));
    Insert::Added
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scheme_is_https() {
        let req = Request::new().host("example.com").build();
        assert_eq!(req.url(), "https://example.com/");
    }

    #[test]
    fn build_renders_params_in_insertion_order() {
        let req = Request::new()
            .scheme("https")
            .host("example.com")
            .endpoint("v1/items")
            .add_param("q", "a b")
            .add_param("limit", 10)
            .build();
        assert_eq!(req.url(), "https://example.com/v1/items?q=a b&limit=10");
    }

    #[test]
    fn url_is_empty_until_built() {
        let req = Request::new().host("example.com").add_param("a", 1);
        assert_eq!(req.url(), "");
    }

    #[test]
    fn build_is_idempotent() {
        let req = Request::new().host("h").endpoint("e").add_param("a", 1).build();
        let first = req.url().to_string();
        let req = req.build();
        assert_eq!(req.url(), first);
    }

    #[test]
    fn url_is_not_recomputed_after_mutation() {
        let req = Request::new()
            .host("example.com")
            .build()
            .scheme("http")
            .host("other.org")
            .add_header("Accept", "text/plain");
        assert_eq!(req.url(), "https://example.com/");
    }

    #[test]
    fn reset_params_clears_params_and_url() {
        let req = Request::new()
            .host("example.com")
            .endpoint("v1")
            .add_param("a", 1)
            .build()
            .reset_params();
        assert!(req.params().is_empty());
        assert_eq!(req.url(), "");

        let req = req.build();
        assert_eq!(req.url(), "https://example.com/v1");
    }

    #[test]
    fn duplicate_param_keys_keep_first_value() {
        let req = Request::new()
            .add_param("a", "1")
            .add_param("b", "2")
            .add_param("a", "3")
            .add_param("b", 4)
            .add_param("c", "5");
        assert_eq!(
            req.params(),
            &[
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
                ("c".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn duplicate_header_keys_keep_first_value() {
        let req = Request::new()
            .add_header("Accept", "text/html")
            .add_header("Accept", "application/json");
        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.headers()[0].1, "text/html");
    }

    #[test]
    fn empty_keys_are_ignored() {
        let req = Request::new().add_param("", "x").add_header("", "y");
        assert!(req.params().is_empty());
        assert!(req.headers().is_empty());
    }

    #[test]
    fn values_render_as_canonical_text() {
        let req = Request::new()
            .add_param("text", "abc")
            .add_param("int", -42i64)
            .add_param("float", 3.5)
            .add_param("small", 0.1f64);
        let values: Vec<&str> = req.params().iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, ["abc", "-42", "3.500000", "0.100000"]);
    }

    #[test]
    fn non_finite_floats_render_lowercase() {
        let req = Request::new()
            .add_param("nan", f64::NAN)
            .add_param("inf", f64::INFINITY)
            .add_param("neg", f64::NEG_INFINITY);
        let values: Vec<&str> = req.params().iter().map(|(_, v)| v.as_str()).collect();
        assert_eq!(values, ["nan", "inf", "-inf"]);
    }

    #[test]
    fn upload_prefers_data_over_body() {
        let req = Request::new().body("from body");
        assert_eq!(req.upload_bytes(), b"from body");
        let req = req.data("from data");
        assert_eq!(req.upload_bytes(), b"from data");
        assert_eq!(req.payload(), "from data");
        assert_eq!(req.body_text(), "from body");
    }

    #[test]
    fn verbose_flag() {
        assert!(!Request::new().is_verbose());
        assert!(Request::new().verbose().is_verbose());
    }
}
