//! Alert payload and `$variable$` substitution

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::AlertError;

static VARIABLE_RE: OnceLock<Regex> = OnceLock::new();

/// Saved-search alert as handed to an action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertPayload {
    /// First result row of the triggering search
    pub result: Map<String, Value>,
    pub search_name: String,
    pub trigger_time: Value,
    pub results_link: String,
    pub app: Option<String>,
    pub owner: String,
    /// Per-action parameters
    pub configuration: Map<String, Value>,
}

impl AlertPayload {
    pub fn from_file(path: &Path) -> Result<Self, AlertError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn app(&self) -> &str {
        self.app.as_deref().unwrap_or("bitsight")
    }

    /// Configuration value as text; numbers and booleans are stringified
    pub fn setting(&self, key: &str) -> Option<String> {
        match self.configuration.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            other => Some(other.to_string()),
        }
    }

    pub fn setting_or(&self, key: &str, default: &str) -> String {
        self.setting(key).unwrap_or_else(|| default.to_string())
    }

    /// `"1"`-style flag with a default when absent
    pub fn flag(&self, key: &str, default: bool) -> bool {
        self.setting(key)
            .map(|v| v.trim() == "1")
            .unwrap_or(default)
    }
}

/// Text of a result value; falsy values (null, false, zero, empty) become ""
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Array(items) if items.is_empty() => String::new(),
        Value::Object(map) if map.is_empty() => String::new(),
        other => other.to_string(),
    }
}

/// Replace `$name$`-style variables with payload values.
///
/// Unknown variables are left untouched, delimiters included.
pub fn substitute_variables(template: &str, payload: &AlertPayload) -> String {
    let mut values: HashMap<String, String> = HashMap::new();
    values.insert("name".into(), payload.search_name.clone());
    values.insert("search_name".into(), payload.search_name.clone());
    values.insert("trigger_time".into(), display_value(&payload.trigger_time));
    values.insert("app".into(), payload.app().to_string());
    values.insert("owner".into(), payload.owner.clone());
    values.insert("results_link".into(), payload.results_link.clone());
    for (key, value) in &payload.result {
        values.insert(format!("result.{}", key), display_value(value));
    }

    let re = VARIABLE_RE.get_or_init(|| Regex::new(r"\$([^$]+)\$").unwrap());
    re.replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
        Some(value) => value.clone(),
        None => caps[0].to_string(),
    })
    .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> AlertPayload {
        serde_json::from_value(json!({
            "search_name": "Rating Drop",
            "trigger_time": 1710505800,
            "results_link": "https://splunk/results",
            "owner": "admin",
            "result": {"company_name": "Acme", "rating": 640, "delta": 0, "note": null},
            "configuration": {"routing_key": "rk", "pass_payload": "0", "smtp_port": 587}
        }))
        .unwrap()
    }

    #[test]
    fn test_substitutes_known_variables() {
        let text = substitute_variables(
            "$name$ for $result.company_name$ ($result.rating$) by $owner$ in $app$",
            &payload(),
        );
        assert_eq!(text, "Rating Drop for Acme (640) by admin in bitsight");
    }

    #[test]
    fn test_unknown_variables_stay_verbatim() {
        let text = substitute_variables("cost $5 and $unknown$ here", &payload());
        assert_eq!(text, "cost $5 and $unknown$ here");
    }

    #[test]
    fn test_falsy_result_values_are_empty() {
        let text = substitute_variables("[$result.delta$][$result.note$]", &payload());
        assert_eq!(text, "[][]");
    }

    #[test]
    fn test_trigger_time_number() {
        assert_eq!(substitute_variables("$trigger_time$", &payload()), "1710505800");
    }

    #[test]
    fn test_settings_access() {
        let payload = payload();
        assert_eq!(payload.setting("routing_key").as_deref(), Some("rk"));
        assert_eq!(payload.setting("smtp_port").as_deref(), Some("587"));
        assert_eq!(payload.setting_or("severity", "error"), "error");
        assert!(!payload.flag("pass_payload", true));
        assert!(payload.flag("include_link", true));
    }

    #[test]
    fn test_missing_sections_default() {
        let payload: AlertPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.result.is_empty());
        assert_eq!(payload.app(), "bitsight");
        assert_eq!(substitute_variables("$search_name$!", &payload), "!");
    }
}
