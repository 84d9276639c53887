//! Request executor bound to one API base URL and token

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;

use crate::transport::{HttpTransport, ProxySettings, Transport};
use crate::ApiError;

pub const DEFAULT_BASE_URL: &str = "https://api.bitsighttech.com/ratings/v1";
pub const USER_AGENT: &str = concat!("bitsight-collector/", env!("CARGO_PKG_VERSION"));

/// Connection parameters shared by every request of one collection run
#[derive(Clone)]
pub struct RequestSettings {
    pub base_url: String,
    pub api_token: String,
    pub proxy: ProxySettings,
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl RequestSettings {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: api_token.into(),
            proxy: ProxySettings::default(),
            verify_tls: true,
            timeout: Duration::from_secs(60),
        }
    }
}

impl std::fmt::Debug for RequestSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSettings")
            .field("base_url", &self.base_url)
            .field("api_token", &"<redacted>")
            .field("proxy", &self.proxy)
            .field("verify_tls", &self.verify_tls)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// `Authorization` value for HTTP Basic auth with the token as username
/// and an empty password
pub fn basic_auth_header(api_token: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:", api_token)))
}

/// Executes authenticated GETs against the ratings API
pub struct ApiClient {
    base_url: String,
    authorization: String,
    transport: Box<dyn Transport>,
}

impl ApiClient {
    /// Build a client backed by the real HTTP transport
    pub fn new(settings: &RequestSettings) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(settings)?;
        Ok(Self::with_transport(
            &settings.base_url,
            &settings.api_token,
            Box::new(transport),
        ))
    }

    pub fn with_transport(base_url: &str, api_token: &str, transport: Box<dyn Transport>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: basic_auth_header(api_token),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path; the path may carry a query string
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET `base_url + path` and decode the body
    pub fn execute(&self, path: &str) -> Result<Value, ApiError> {
        tracing::debug!(path, "GET");
        self.transport
            .get_json(&self.url_for(path), &self.authorization)
    }

    /// GET an absolute URL (continuation pointers) with the same credentials
    pub fn fetch_url(&self, url: &str) -> Result<Value, ApiError> {
        tracing::debug!(url, "GET");
        self.transport.get_json(url, &self.authorization)
    }
}
