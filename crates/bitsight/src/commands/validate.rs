//! First-run configuration and connectivity checks

use std::time::Duration;

use bitsight_api::{ApiClient, ApiError, DEFAULT_BASE_URL};
use bitsight_core::{is_known_risk_vector, parse_risk_vectors, EndpointCatalog, Settings};
use bitsight_telemetry::{atomic_write, Paths};
use serde::Serialize;
use serde_json::Value;

const PROXY_PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const MIN_INTERVAL_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Warning,
    Skip,
}

impl CheckStatus {
    fn label(self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warning => "WARN",
            CheckStatus::Skip => "SKIP",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum OverallStatus {
    Passed,
    PassedWithWarnings,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
struct Check {
    name: &'static str,
    status: CheckStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
struct ValidationReport {
    timestamp: String,
    checks: Vec<Check>,
    overall_status: OverallStatus,
    errors: Vec<String>,
    warnings: Vec<String>,
}

/// Network probes used by the connectivity checks
trait Probe {
    /// `GET /users/me` with the configured credentials
    fn current_user(&self, settings: &Settings) -> Result<Value, ApiError>;

    /// Any HTTP response through the proxy counts as reachable
    fn through_proxy(&self, settings: &Settings) -> Result<(), String>;
}

struct LiveProbe;

impl Probe for LiveProbe {
    fn current_user(&self, settings: &Settings) -> Result<Value, ApiError> {
        ApiClient::new(&settings.request_settings())?.execute("/users/me")
    }

    fn through_proxy(&self, settings: &Settings) -> Result<(), String> {
        let proxy_url = settings
            .proxy
            .effective_url()
            .ok_or_else(|| "proxy is not configured".to_string())?;
        let proxy =
            reqwest::Proxy::all(proxy_url.as_str()).map_err(|e| e.without_url().to_string())?;
        let client = reqwest::blocking::Client::builder()
            .proxy(proxy)
            .timeout(PROXY_PROBE_TIMEOUT)
            .build()
            .map_err(|e| e.to_string())?;
        client
            .get(DEFAULT_BASE_URL)
            .send()
            .map(|_| ())
            .map_err(|e| e.without_url().to_string())
    }
}

struct Validator<'a> {
    settings: &'a Settings,
    checks: Vec<Check>,
}

impl<'a> Validator<'a> {
    fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            checks: Vec::new(),
        }
    }

    fn add(
        &mut self,
        name: &'static str,
        status: CheckStatus,
        message: impl Into<String>,
        details: Option<String>,
    ) {
        let message = message.into();
        tracing::info!(check = name, status = status.label(), "{}", message);
        self.checks.push(Check {
            name,
            status,
            message,
            details,
        });
    }

    fn check_api_settings(&mut self) {
        let settings = self.settings;
        if settings.api.api_token.is_empty() {
            self.add(
                "api_token",
                CheckStatus::Fail,
                "API token is not configured",
                Some("Run `bitsight config set api api_token <token>`".to_string()),
            );
        } else {
            self.add("api_token", CheckStatus::Pass, "API token is configured", None);
        }

        let base_url = &settings.api.base_url;
        if base_url.trim().is_empty() {
            self.add(
                "base_url",
                CheckStatus::Warning,
                "Base URL is empty, using default",
                Some(format!("Using {}", DEFAULT_BASE_URL)),
            );
        } else {
            self.add("base_url", CheckStatus::Pass, format!("Base URL: {}", base_url), None);
        }
    }

    fn check_api_connection(&mut self, probe: &dyn Probe) {
        let settings = self.settings;
        if settings.api.api_token.is_empty() {
            self.add("api_connection", CheckStatus::Skip, "Skipped - no API token", None);
            return;
        }

        match probe.current_user(settings) {
            Ok(user) => {
                let email = user.get("email").and_then(Value::as_str).unwrap_or("Unknown");
                self.add(
                    "api_connection",
                    CheckStatus::Pass,
                    "Successfully connected to Bitsight API",
                    Some(format!("Authenticated as: {}", email)),
                );
            }
            Err(ApiError::Http { status, .. }) if (400..500).contains(&status) => self.add(
                "api_connection",
                CheckStatus::Fail,
                format!("API authentication failed: HTTP {}", status),
                Some("Verify your API token is correct and has proper permissions".to_string()),
            ),
            Err(ApiError::Network { reason }) => self.add(
                "api_connection",
                CheckStatus::Fail,
                format!("Cannot reach Bitsight API: {}", reason),
                Some("Check network connectivity and proxy settings".to_string()),
            ),
            Err(e) => self.add(
                "api_connection",
                CheckStatus::Fail,
                format!("API connection error: {}", e),
                None,
            ),
        }
    }

    fn check_proxy(&mut self, probe: &dyn Probe) {
        let settings = self.settings;
        let proxy = &settings.proxy;
        if !proxy.enabled {
            self.add("proxy", CheckStatus::Skip, "Proxy is disabled", None);
            self.add("proxy_connection", CheckStatus::Skip, "Proxy is disabled", None);
            return;
        }

        if proxy.url.is_empty() {
            self.add(
                "proxy",
                CheckStatus::Fail,
                "Proxy is enabled but URL is not configured",
                Some("Run `bitsight config set proxy proxy_url <url>`".to_string()),
            );
            self.add("proxy_connection", CheckStatus::Skip, "No proxy URL configured", None);
            return;
        }

        let url = &proxy.url;
        if url.starts_with("http://") || url.starts_with("https://") {
            self.add("proxy", CheckStatus::Pass, format!("Proxy configured: {}", url), None);
        } else {
            self.add(
                "proxy",
                CheckStatus::Warning,
                "Proxy URL should start with http:// or https://",
                Some(format!("Current value: {}", url)),
            );
        }

        match probe.through_proxy(settings) {
            Ok(()) => self.add(
                "proxy_connection",
                CheckStatus::Pass,
                format!("Proxy connection successful via {}", url),
                None,
            ),
            Err(reason) => self.add(
                "proxy_connection",
                CheckStatus::Fail,
                format!("Proxy connection failed: {}", reason),
                Some("Verify proxy URL and credentials".to_string()),
            ),
        }
    }

    fn check_inputs(&mut self) {
        let catalog = EndpointCatalog::global();
        let settings = self.settings;
        let enabled: Vec<_> = settings.enabled_inputs().collect();

        let unknown_endpoints: Vec<String> = enabled
            .iter()
            .filter(|input| !catalog.contains(&input.endpoint))
            .map(|input| format!("{} ({})", input.name, input.endpoint))
            .collect();
        let unknown_vectors: Vec<String> = enabled
            .iter()
            .flat_map(|input| parse_risk_vectors(&input.risk_vectors))
            .filter(|vector| !is_known_risk_vector(vector))
            .collect();

        if enabled.is_empty() {
            self.add(
                "inputs",
                CheckStatus::Warning,
                "No data inputs are enabled",
                Some("Add an input to the config file and enable it".to_string()),
            );
        } else if !unknown_endpoints.is_empty() {
            self.add(
                "inputs",
                CheckStatus::Fail,
                "Some inputs use unknown endpoints",
                Some(unknown_endpoints.join(", ")),
            );
        } else if !unknown_vectors.is_empty() {
            self.add(
                "inputs",
                CheckStatus::Warning,
                "Some inputs filter on unknown risk vectors",
                Some(unknown_vectors.join(", ")),
            );
        } else {
            let names: Vec<&str> = enabled.iter().map(|input| input.name.as_str()).collect();
            self.add(
                "inputs",
                CheckStatus::Pass,
                format!("{} data input(s) enabled", enabled.len()),
                Some(format!("Enabled: {}", names.join(", "))),
            );
        }
    }

    fn check_collection_settings(&mut self) {
        let collection = &self.settings.collection;
        let short: Vec<String> = [
            ("portfolio_interval", collection.portfolio_interval),
            ("findings_interval", collection.findings_interval),
            ("alerts_interval", collection.alerts_interval),
        ]
        .iter()
        .filter(|(_, secs)| *secs < MIN_INTERVAL_SECS)
        .map(|(key, secs)| {
            format!(
                "{} is set to {}s (minimum recommended: {}s)",
                key, secs, MIN_INTERVAL_SECS
            )
        })
        .collect();

        if short.is_empty() {
            self.add(
                "collection_settings",
                CheckStatus::Pass,
                "Collection settings are valid",
                None,
            );
        } else {
            self.add(
                "collection_settings",
                CheckStatus::Warning,
                "Some collection settings may need review",
                Some(short.join("; ")),
            );
        }
    }

    fn run(mut self, probe: &dyn Probe) -> ValidationReport {
        self.check_api_settings();
        self.check_api_connection(probe);
        self.check_proxy(probe);
        self.check_inputs();
        self.check_collection_settings();

        let errors: Vec<String> = self
            .checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .map(|c| format!("{}: {}", c.name, c.message))
            .collect();
        let warnings: Vec<String> = self
            .checks
            .iter()
            .filter(|c| c.status == CheckStatus::Warning)
            .map(|c| format!("{}: {}", c.name, c.message))
            .collect();

        let overall_status = if !errors.is_empty() {
            OverallStatus::Failed
        } else if !warnings.is_empty() {
            OverallStatus::PassedWithWarnings
        } else {
            OverallStatus::Passed
        };

        ValidationReport {
            timestamp: chrono::Local::now().to_rfc3339(),
            checks: self.checks,
            overall_status,
            errors,
            warnings,
        }
    }
}

fn render_summary(report: &ValidationReport) -> String {
    let mut lines = vec![
        "Bitsight Configuration Validation".to_string(),
        "=".repeat(40),
        format!("Timestamp: {}", report.timestamp),
        format!(
            "Overall Status: {}",
            serde_json::to_value(report.overall_status)
                .ok()
                .and_then(|v| v.as_str().map(str::to_uppercase))
                .unwrap_or_default()
        ),
        String::new(),
    ];

    for check in &report.checks {
        lines.push(format!("  [{}] {}: {}", check.status.label(), check.name, check.message));
        if let Some(details) = &check.details {
            lines.push(format!("         {}", details));
        }
    }

    if !report.errors.is_empty() {
        lines.push("\nERRORS:".to_string());
        lines.extend(report.errors.iter().map(|e| format!("  - {}", e)));
    }
    if !report.warnings.is_empty() {
        lines.push("\nWARNINGS:".to_string());
        lines.extend(report.warnings.iter().map(|w| format!("  - {}", w)));
    }

    lines.join("\n")
}

pub fn run(json: bool) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let settings = Settings::load_with_env(&paths.config_file())?;

    let report = Validator::new(&settings).run(&LiveProbe);
    let report_json = serde_json::to_string_pretty(&report)?;
    atomic_write(&paths.validation_file(), report_json.as_bytes())?;

    if json {
        println!("{}", report_json);
    } else {
        println!("{}", render_summary(&report));
    }

    if report.overall_status == OverallStatus::Failed {
        anyhow::bail!("validation failed with {} error(s)", report.errors.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitsight_core::InputConfig;
    use serde_json::json;

    struct FakeProbe {
        user: Result<Value, ApiError>,
        proxy: Result<(), String>,
    }

    impl FakeProbe {
        fn healthy() -> Self {
            Self {
                user: Ok(json!({"email": "analyst@example.com"})),
                proxy: Ok(()),
            }
        }
    }

    impl Probe for FakeProbe {
        fn current_user(&self, _settings: &Settings) -> Result<Value, ApiError> {
            self.user.clone()
        }

        fn through_proxy(&self, _settings: &Settings) -> Result<(), String> {
            self.proxy.clone()
        }
    }

    /// Records the base URL the connection check would request against
    #[derive(Default)]
    struct RecordingProbe {
        base_url: std::cell::RefCell<Option<String>>,
    }

    impl Probe for RecordingProbe {
        fn current_user(&self, settings: &Settings) -> Result<Value, ApiError> {
            *self.base_url.borrow_mut() = Some(settings.request_settings().base_url);
            Ok(json!({"email": "analyst@example.com"}))
        }

        fn through_proxy(&self, _settings: &Settings) -> Result<(), String> {
            Ok(())
        }
    }

    fn configured() -> Settings {
        let mut settings = Settings::default();
        settings.api.api_token = "tok".to_string();
        settings.inputs.push(InputConfig::new("findings", "findings"));
        settings
    }

    fn status_of(report: &ValidationReport, name: &str) -> CheckStatus {
        report
            .checks
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.status)
            .unwrap()
    }

    #[test]
    fn test_healthy_configuration_passes() {
        let settings = configured();
        let report = Validator::new(&settings).run(&FakeProbe::healthy());

        assert_eq!(report.overall_status, OverallStatus::Passed);
        assert_eq!(status_of(&report, "api_connection"), CheckStatus::Pass);
        assert_eq!(status_of(&report, "proxy"), CheckStatus::Skip);
        assert_eq!(status_of(&report, "proxy_connection"), CheckStatus::Skip);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_blank_base_url_connects_to_default() {
        let mut settings = configured();
        settings.api.base_url = String::new();
        let probe = RecordingProbe::default();
        let report = Validator::new(&settings).run(&probe);

        assert_eq!(status_of(&report, "base_url"), CheckStatus::Warning);
        assert_eq!(status_of(&report, "api_connection"), CheckStatus::Pass);
        assert_eq!(probe.base_url.borrow().as_deref(), Some(DEFAULT_BASE_URL));
    }

    #[test]
    fn test_missing_token_fails_and_skips_connection() {
        let settings = Settings::default();
        let report = Validator::new(&settings).run(&FakeProbe::healthy());

        assert_eq!(report.overall_status, OverallStatus::Failed);
        assert_eq!(status_of(&report, "api_token"), CheckStatus::Fail);
        assert_eq!(status_of(&report, "api_connection"), CheckStatus::Skip);
        assert_eq!(status_of(&report, "inputs"), CheckStatus::Warning);
    }

    #[test]
    fn test_rejected_token() {
        let settings = configured();
        let probe = FakeProbe {
            user: Err(ApiError::Http {
                status: 401,
                reason: "Unauthorized".to_string(),
            }),
            proxy: Ok(()),
        };
        let report = Validator::new(&settings).run(&probe);

        assert_eq!(status_of(&report, "api_connection"), CheckStatus::Fail);
        assert!(report.errors[0].contains("API authentication failed: HTTP 401"));
    }

    #[test]
    fn test_proxy_checks() {
        let mut settings = configured();
        settings.proxy.enabled = true;
        let report = Validator::new(&settings).run(&FakeProbe::healthy());
        assert_eq!(status_of(&report, "proxy"), CheckStatus::Fail);
        assert_eq!(status_of(&report, "proxy_connection"), CheckStatus::Skip);

        settings.proxy.url = "proxy.local:3128".to_string();
        let probe = FakeProbe {
            proxy: Err("connection refused".to_string()),
            ..FakeProbe::healthy()
        };
        let report = Validator::new(&settings).run(&probe);
        assert_eq!(status_of(&report, "proxy"), CheckStatus::Warning);
        assert_eq!(status_of(&report, "proxy_connection"), CheckStatus::Fail);
        assert_eq!(report.overall_status, OverallStatus::Failed);
    }

    #[test]
    fn test_short_intervals_warn() {
        let mut settings = configured();
        settings.collection.alerts_interval = 60;
        let report = Validator::new(&settings).run(&FakeProbe::healthy());

        assert_eq!(status_of(&report, "collection_settings"), CheckStatus::Warning);
        assert_eq!(report.overall_status, OverallStatus::PassedWithWarnings);
    }

    #[test]
    fn test_unknown_risk_vector_warns() {
        let mut settings = configured();
        settings.inputs[0].risk_vectors = "spf,teleportation".to_string();
        let report = Validator::new(&settings).run(&FakeProbe::healthy());

        assert_eq!(status_of(&report, "inputs"), CheckStatus::Warning);
        assert!(report.warnings[0].contains("unknown risk vectors"));
    }

    #[test]
    fn test_report_json_shape() {
        let settings = configured();
        let report = Validator::new(&settings).run(&FakeProbe::healthy());
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["overall_status"], "passed");
        assert_eq!(value["checks"][0]["name"], "api_token");
        assert_eq!(value["checks"][0]["status"], "pass");
        assert!(value["checks"][0].get("details").is_none());
    }

    #[test]
    fn test_summary_lists_checks() {
        let settings = Settings::default();
        let report = Validator::new(&settings).run(&FakeProbe::healthy());
        let summary = render_summary(&report);

        assert!(summary.contains("Overall Status: FAILED"));
        assert!(summary.contains("[FAIL] api_token"));
        assert!(summary.contains("ERRORS:"));
    }
}
