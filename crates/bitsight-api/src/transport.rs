//! Network seam: one authenticated GET returning decoded JSON

use std::sync::Arc;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{RequestSettings, USER_AGENT};
use crate::ApiError;

/// Issues a GET against an absolute URL and decodes the JSON body
pub trait Transport: Send + Sync {
    fn get_json(&self, url: &str, authorization: &str) -> Result<Value, ApiError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get_json(&self, url: &str, authorization: &str) -> Result<Value, ApiError> {
        (**self).get_json(url, authorization)
    }
}

/// Outbound proxy configuration
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub enabled: bool,
    pub url: String,
    pub username: String,
    pub password: String,
}

impl ProxySettings {
    /// Proxy URL to route through, with credentials embedded when both
    /// username and password are set. `None` when the proxy is off.
    pub fn effective_url(&self) -> Option<String> {
        if !self.enabled || self.url.is_empty() {
            return None;
        }
        if self.username.is_empty() || self.password.is_empty() {
            return Some(self.url.clone());
        }
        let (scheme, rest) = self
            .url
            .split_once("://")
            .unwrap_or(("http", self.url.as_str()));
        Some(format!(
            "{}://{}:{}@{}",
            scheme, self.username, self.password, rest
        ))
    }
}

impl std::fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxySettings")
            .field("enabled", &self.enabled)
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `reqwest` blocking transport honoring proxy, TLS and timeout settings
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(settings: &RequestSettings) -> Result<Self, ApiError> {
        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT);

        if let Some(proxy_url) = settings.proxy.effective_url() {
            let proxy = reqwest::Proxy::all(&proxy_url).map_err(|e| ApiError::InvalidSettings {
                reason: format!("invalid proxy URL: {}", without_url(e)),
            })?;
            builder = builder.proxy(proxy);
            tracing::debug!(proxy = %settings.proxy.url, "routing API traffic through proxy");
        }

        if !settings.verify_tls {
            tracing::warn!("TLS certificate and hostname verification disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().map_err(|e| ApiError::InvalidSettings {
            reason: e.to_string(),
        })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get_json(&self, url: &str, authorization: &str) -> Result<Value, ApiError> {
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(network_error)?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().map_err(network_error)?;
        serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse {
            reason: e.to_string(),
        })
    }
}

fn network_error(err: reqwest::Error) -> ApiError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        without_url(err)
    };
    ApiError::Network { reason }
}

// Proxy URLs can carry credentials; keep URLs out of error text.
fn without_url(err: reqwest::Error) -> String {
    err.without_url().to_string()
}
