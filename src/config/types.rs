//! Server and client configuration. Both sides must agree on `path_prefix`.

use crate::request::Context;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_PATH_PREFIX: &str = "/api";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Fixed path segment between the prefix and a GET resource name.
pub const RESOURCE_SEGMENT: &str = "/resource/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetcherConfig {
    pub path_prefix: String,
    /// Upper bound on POST envelope size.
    pub max_body_bytes: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        FetcherConfig {
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl FetcherConfig {
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// `{prefix}/resource/`, the start of every read path.
    pub fn resource_path(&self) -> String {
        format!("{}{}", self.path_prefix, RESOURCE_SEGMENT)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    /// Scheme and host, e.g. `http://localhost:3000`. Empty for relative URLs.
    pub base_url: String,
    pub path_prefix: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
    /// Context sent with every call; per-call entries override these.
    pub context: Context,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: String::new(),
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            headers: BTreeMap::new(),
            timeout: None,
            context: Context::new(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ClientConfig {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Lay per-call overrides over these defaults.
    pub fn merged(&self, overrides: &CallConfig) -> TransportConfig {
        let mut headers = self.headers.clone();
        headers.extend(overrides.headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        TransportConfig {
            headers,
            timeout: overrides.timeout.or(self.timeout),
        }
    }
}

/// Per-call overrides; `CallConfig::default()` leaves the client defaults untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallConfig {
    pub headers: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

/// Effective settings handed to the transport for one call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransportConfig {
    pub headers: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}
