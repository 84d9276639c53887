//! Collector settings: API access, proxy, collection defaults, inputs

use std::path::Path;
use std::time::Duration;

use bitsight_api::{ProxySettings, RequestSettings, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::EndpointCatalog;
use crate::context::{parse_risk_vectors, ScopingContext};

/// Placeholder shown instead of stored secrets
pub const SECRET_MASK: &str = "********";

/// Environment variable overriding the stored API token
pub const TOKEN_ENV: &str = "BITSIGHT_API_TOKEN";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("unknown setting {section}.{key}")]
    UnknownField { section: String, key: String },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("API token is required")]
    MissingToken,

    #[error("Invalid endpoint: {endpoint}")]
    UnknownEndpoint { endpoint: String },

    #[error("Proxy URL is required when proxy is enabled")]
    MissingProxyUrl,
}

/// API access settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub api_token: String,
    pub base_url: String,
    pub verify_ssl: bool,
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_token: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            verify_ssl: true,
            timeout_secs: 60,
        }
    }
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Collection intervals (seconds) and history depth
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    pub portfolio_interval: u64,
    pub findings_interval: u64,
    pub alerts_interval: u64,
    pub days_back: u32,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            portfolio_interval: 3600,
            findings_interval: 3600,
            alerts_interval: 900,
            days_back: ScopingContext::DEFAULT_DAYS_BACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub log_level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// One configured data input: an endpoint plus its scoping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub name: String,
    pub endpoint: String,
    pub enabled: bool,
    pub index: String,
    pub company_guid: Option<String>,
    pub user_guid: Option<String>,
    pub observation_id: Option<String>,
    /// Comma-separated risk vectors for findings endpoints
    pub risk_vectors: String,
    pub days_back: Option<u32>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            endpoint: String::new(),
            enabled: true,
            index: "main".to_string(),
            company_guid: None,
            user_guid: None,
            observation_id: None,
            risk_vectors: String::new(),
            days_back: None,
        }
    }
}

impl InputConfig {
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Scoping context for this input, falling back to collection defaults
    pub fn scoping_context(&self, defaults: &CollectionSettings) -> ScopingContext {
        let mut ctx = ScopingContext::new()
            .with_risk_vectors(parse_risk_vectors(&self.risk_vectors))
            .with_days_back(self.days_back.unwrap_or(defaults.days_back));
        if let Some(guid) = &self.company_guid {
            ctx = ctx.with_company(guid.as_str());
        }
        if let Some(guid) = &self.user_guid {
            ctx = ctx.with_user(guid.as_str());
        }
        if let Some(id) = &self.observation_id {
            ctx = ctx.with_observation(id.as_str());
        }
        ctx
    }

    /// Reject inputs that cannot run against the given settings
    pub fn validate(&self, settings: &Settings) -> Result<(), SettingsError> {
        if settings.api.api_token.is_empty() {
            return Err(SettingsError::MissingToken);
        }
        if !EndpointCatalog::global().contains(&self.endpoint) {
            return Err(SettingsError::UnknownEndpoint {
                endpoint: self.endpoint.clone(),
            });
        }
        if settings.proxy.enabled && settings.proxy.url.is_empty() {
            return Err(SettingsError::MissingProxyUrl);
        }
        Ok(())
    }
}

/// Complete collector configuration, stored as JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub proxy: ProxySettings,
    pub collection: CollectionSettings,
    pub logging: LoggingSettings,
    pub inputs: Vec<InputConfig>,
}

impl Settings {
    /// Load settings from disk; a missing file yields defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    /// Load from disk, then apply environment overrides
    pub fn load_with_env(path: &Path) -> anyhow::Result<Self> {
        let mut settings = Self::load(path)?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                self.api.api_token = token;
            }
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        bitsight_telemetry::atomic_write(path, json.as_bytes())?;
        Ok(())
    }

    /// Copy with secrets replaced by [`SECRET_MASK`]
    pub fn masked(&self) -> Settings {
        let mut masked = self.clone();
        if !masked.api.api_token.is_empty() {
            masked.api.api_token = SECRET_MASK.to_string();
        }
        if !masked.proxy.password.is_empty() {
            masked.proxy.password = SECRET_MASK.to_string();
        }
        masked
    }

    /// Update one field. Secret fields ignore empty values and the mask
    /// placeholder so an edited masked listing never overwrites them.
    pub fn apply_edit(
        &mut self,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<(), SettingsError> {
        match (section, key) {
            ("api", "api_token") | ("settings", "api_token") => {
                if !is_placeholder(value) {
                    self.api.api_token = value.to_string();
                }
            }
            ("api", "base_url") | ("settings", "base_url") => self.api.base_url = value.to_string(),
            ("api", "verify_ssl") | ("settings", "verify_ssl") => {
                self.api.verify_ssl = parse_bool(key, value)?
            }
            ("api", "timeout") | ("api", "timeout_secs") | ("settings", "timeout") => {
                self.api.timeout_secs = parse_number(key, value)?
            }
            ("proxy", "proxy_enabled") | ("proxy", "enabled") => {
                self.proxy.enabled = parse_bool(key, value)?
            }
            ("proxy", "proxy_url") | ("proxy", "url") => self.proxy.url = value.to_string(),
            ("proxy", "proxy_username") | ("proxy", "username") => {
                self.proxy.username = value.to_string()
            }
            ("proxy", "proxy_password") | ("proxy", "password") => {
                if !is_placeholder(value) {
                    self.proxy.password = value.to_string();
                }
            }
            ("collection", "portfolio_interval") => {
                self.collection.portfolio_interval = parse_number(key, value)?
            }
            ("collection", "findings_interval") => {
                self.collection.findings_interval = parse_number(key, value)?
            }
            ("collection", "alerts_interval") => {
                self.collection.alerts_interval = parse_number(key, value)?
            }
            ("collection", "days_back") => self.collection.days_back = parse_number(key, value)?,
            ("logging", "log_level") => self.logging.log_level = value.to_string(),
            ("inputs", name) => {
                let enabled = parse_bool(key, value)?;
                let name = name.strip_prefix("input_").unwrap_or(name);
                let input = self
                    .inputs
                    .iter_mut()
                    .find(|input| input.name == name)
                    .ok_or_else(|| SettingsError::UnknownField {
                        section: section.to_string(),
                        key: key.to_string(),
                    })?;
                input.enabled = enabled;
            }
            _ => {
                return Err(SettingsError::UnknownField {
                    section: section.to_string(),
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }

    /// Connection parameters for the API client; a blank base URL falls
    /// back to [`DEFAULT_BASE_URL`]
    pub fn request_settings(&self) -> RequestSettings {
        let base_url = match self.api.base_url.trim() {
            "" => DEFAULT_BASE_URL.to_string(),
            url => url.to_string(),
        };
        RequestSettings {
            base_url,
            api_token: self.api.api_token.clone(),
            proxy: self.proxy.clone(),
            verify_tls: self.api.verify_ssl,
            timeout: Duration::from_secs(self.api.timeout_secs),
        }
    }

    pub fn enabled_inputs(&self) -> impl Iterator<Item = &InputConfig> {
        self.inputs.iter().filter(|input| input.enabled)
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value == SECRET_MASK
}

fn parse_bool(key: &str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SettingsError> {
    value.trim().parse().map_err(|_| SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
