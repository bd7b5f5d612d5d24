//! Snapshot of the transfer engine's build: versions, protocols, features.
//!
//! # Design
//! Read once from the engine and never refreshed. Sub-libraries the engine
//! was built without stay empty (or zero) and are left out of both the JSON
//! and the printed view. Protocol and feature lists are sorted ignoring
//! case so output is stable across builds that report them in other orders.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    curl_version: String,
    version_number: u32,
    host: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    ssl_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    libz_version: String,
    protocols: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    ares: String,
    #[serde(skip_serializing_if = "is_zero")]
    ares_number: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    libidn: String,
    #[serde(skip_serializing_if = "is_zero")]
    iconv_ver_number: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    libssh_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    brotli_version: String,
    #[serde(skip_serializing_if = "is_zero")]
    brotli_ver_number: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    nghttp2_version: String,
    #[serde(skip_serializing_if = "is_zero")]
    nghttp2_ver_number: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    quic_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    ca_info: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    ca_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    zstd_version: String,
    #[serde(skip_serializing_if = "is_zero")]
    zstd_ver_number: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    hyper_version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    gsasl_version: String,
    feature_names: Vec<String>,
}

/// Every feature flag the engine reports, with libcurl's own spelling.
fn engine_features(v: &curl::Version) -> [(bool, &'static str); 24] {
    [
        (v.feature_async_dns(), "AsynchDNS"),
        (v.feature_conv(), "Conv"),
        (v.feature_debug(), "Debug"),
        (v.feature_gsasl(), "gsasl"),
        (v.feature_gss_negotiate(), "GSS-API"),
        (v.feature_hsts(), "HSTS"),
        (v.feature_https_proxy(), "HTTPS-proxy"),
        (v.feature_idn(), "IDN"),
        (v.feature_ipv6(), "IPv6"),
        (v.feature_largefile(), "Largefile"),
        (v.feature_libz(), "libz"),
        (v.feature_ntlm(), "NTLM"),
        (v.feature_ntlm_wb(), "NTLM_WB"),
        (v.feature_spnego(), "SPNEGO"),
        (v.feature_ssl(), "SSL"),
        (v.feature_sspi(), "SSPI"),
        (v.feature_tlsauth_srp(), "TLS-SRP"),
        (v.feature_unicode(), "Unicode"),
        (v.feature_unix_domain_socket(), "UnixSockets"),
        (v.feature_altsvc(), "alt-svc"),
        (v.feature_brotli(), "brotli"),
        (v.feature_http2(), "HTTP2"),
        (v.feature_http3(), "HTTP3"),
        (v.feature_zstd(), "zstd"),
    ]
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl VersionInfo {
    /// Query the linked engine.
    pub fn new() -> Self {
        Self::from_engine(&curl::Version::get())
    }

    fn from_engine(v: &curl::Version) -> Self {
        let mut protocols: Vec<String> = v.protocols().map(str::to_string).collect();
        sort_ignore_case(&mut protocols);

        let mut feature_names: Vec<String> = engine_features(v)
            .into_iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| name.to_string())
            .collect();
        sort_ignore_case(&mut feature_names);

        let text = |s: Option<&str>| s.unwrap_or_default().to_string();
        let num = |n: Option<u32>| n.unwrap_or_default();

        Self {
            curl_version: v.version().to_string(),
            version_number: v.version_num(),
            host: v.host().to_string(),
            ssl_version: text(v.ssl_version()),
            libz_version: text(v.libz_version()),
            protocols,
            ares: text(v.ares_version()),
            ares_number: v.ares_version().map_or(0, |_| num(v.ares_version_num())),
            libidn: text(v.libidn_version()),
            iconv_ver_number: num(v.iconv_version_num()),
            libssh_version: text(v.libssh_version()),
            brotli_version: text(v.brotli_version()),
            brotli_ver_number: v.brotli_version().map_or(0, |_| num(v.brotli_version_num())),
            nghttp2_version: text(v.nghttp2_version()),
            nghttp2_ver_number: v.nghttp2_version().map_or(0, |_| num(v.nghttp2_version_num())),
            quic_version: text(v.quic_version()),
            ca_info: text(v.cainfo()),
            ca_path: text(v.capath()),
            zstd_version: text(v.zstd_version()),
            zstd_ver_number: v.zstd_version().map_or(0, |_| num(v.zstd_ver_num())),
            hyper_version: text(v.hyper_version()),
            gsasl_version: text(v.gsasl_version()),
            feature_names,
        }
    }

    pub fn version(&self) -> &str {
        &self.curl_version
    }

    pub fn version_number(&self) -> u32 {
        self.version_number
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn ssl_version(&self) -> Option<&str> {
        non_empty(&self.ssl_version)
    }

    pub fn libz_version(&self) -> Option<&str> {
        non_empty(&self.libz_version)
    }

    pub fn protocols(&self) -> &[String] {
        &self.protocols
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Pretty-printed JSON view.
    pub fn as_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}"))
    }

    /// Write the human-readable view to stdout.
    pub fn print(&self) {
        print!("{self}");
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

fn sort_ignore_case(items: &mut [String]) {
    items.sort_by_cached_key(|s| s.to_lowercase());
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "curl info {{")?;
        writeln!(f, "\t           version: {} ({})", self.curl_version, self.version_number)?;
        writeln!(f, "\t              host: {}", self.host)?;

        let optional = [
            ("       ssl version", &self.ssl_version),
            ("      libz version", &self.libz_version),
        ];
        for (label, value) in optional {
            if !value.is_empty() {
                writeln!(f, "\t{label}: {value}")?;
            }
        }
        if !self.ares.is_empty() {
            writeln!(f, "\t              ares: {}", self.ares)?;
            writeln!(f, "\t       ares number: {}", self.ares_number)?;
        }
        if !self.libidn.is_empty() {
            writeln!(f, "\t            libidn: {}", self.libidn)?;
        }
        if self.iconv_ver_number != 0 {
            writeln!(f, "\t  iconv ver number: {}", self.iconv_ver_number)?;
        }
        if !self.libssh_version.is_empty() {
            writeln!(f, "\t    libssh version: {}", self.libssh_version)?;
        }
        if !self.brotli_version.is_empty() {
            writeln!(f, "\t    brotli version: {}", self.brotli_version)?;
            writeln!(f, "\t brotli ver number: {}", self.brotli_ver_number)?;
        }
        if !self.nghttp2_version.is_empty() {
            writeln!(f, "\t   nghttp2 version: {}", self.nghttp2_version)?;
            writeln!(f, "\tnghttp2 ver number: {}", self.nghttp2_ver_number)?;
        }
        let optional = [
            ("      quic version", &self.quic_version),
            ("           CA info", &self.ca_info),
            ("           CA path", &self.ca_path),
        ];
        for (label, value) in optional {
            if !value.is_empty() {
                writeln!(f, "\t{label}: {value}")?;
            }
        }
        if !self.zstd_version.is_empty() {
            writeln!(f, "\t      zstd version: {}", self.zstd_version)?;
            writeln!(f, "\t   zstd ver number: {}", self.zstd_ver_number)?;
        }
        let optional = [
            ("     hyper version", &self.hyper_version),
            ("     gsasl version", &self.gsasl_version),
        ];
        for (label, value) in optional {
            if !value.is_empty() {
                writeln!(f, "\t{label}: {value}")?;
            }
        }

        writeln!(f, "\t         protocols: {}", self.protocols.join(","))?;
        writeln!(f, "\t          features: {}", self.feature_names.join(","))?;
        writeln!(f, "}}")
    }
}
