//! Where the client sends requests.

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://www.tickspot.com/";
pub const DEFAULT_API_VERSION: &str = "v2";

/// Base host and API version used to derive a subscription's API URL.
///
/// Deserializable so hosts can embed it in their own configuration files;
/// missing fields fall back to the public Tick endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_version: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at another host, e.g. a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with `TICK_BASE_URL` and `TICK_API_VERSION`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(base_url) = lookup("TICK_BASE_URL").filter(|v| !v.is_empty()) {
            config.base_url = base_url;
        }
        if let Some(api_version) = lookup("TICK_API_VERSION").filter(|v| !v.is_empty()) {
            config.api_version = api_version;
        }
        config
    }

    /// `<base>/<subscription_id>/api/<version>/`, always with a trailing slash.
    pub fn api_url(&self, subscription_id: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let version = self.api_version.trim_matches('/');
        format!("{base}/{subscription_id}/api/{version}/")
    }
}
