//! PagerDuty Events API v2 action

use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::payload::substitute_variables;
use crate::{AlertAction, AlertError, AlertPayload};

pub const PAGERDUTY_EVENTS_URL: &str = "https://events.pagerduty.com/v2/enqueue";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the Events API body from the payload configuration.
///
/// `summary`, `dedup_key` and `component` accept `$variable$` templates;
/// `dedup_key` and `component` are left out when they render empty.
pub fn build_event(payload: &AlertPayload) -> Result<Value, AlertError> {
    let routing_key = payload.setting_or("routing_key", "");
    if routing_key.is_empty() {
        return Err(AlertError::MissingSetting(
            "No PagerDuty routing key configured",
        ));
    }

    let summary = substitute_variables(&payload.setting_or("summary", "Bitsight Alert"), payload);
    let dedup_key = substitute_variables(&payload.setting_or("dedup_key", ""), payload);
    let component = substitute_variables(&payload.setting_or("component", ""), payload);

    let mut details = Map::new();
    details.insert("summary".into(), Value::from(summary));
    details.insert(
        "severity".into(),
        Value::from(payload.setting_or("severity", "error")),
    );
    details.insert(
        "source".into(),
        Value::from(payload.setting_or("source", "Splunk Bitsight App")),
    );
    if !component.is_empty() {
        details.insert("component".into(), Value::from(component));
    }
    details.insert(
        "group".into(),
        Value::from(payload.setting_or("group", "vendor-risk")),
    );
    details.insert(
        "class".into(),
        Value::from(payload.setting_or("class", "security-rating")),
    );
    details.insert(
        "custom_details".into(),
        json!({
            "search_name": payload.search_name,
            "trigger_time": payload.trigger_time,
            "results_link": payload.results_link,
            "result": payload.result,
        }),
    );

    let mut event = Map::new();
    event.insert("routing_key".into(), Value::from(routing_key));
    event.insert(
        "event_action".into(),
        Value::from(payload.setting_or("event_action", "trigger")),
    );
    if !dedup_key.is_empty() {
        event.insert("dedup_key".into(), Value::from(dedup_key));
    }
    event.insert("payload".into(), Value::Object(details));

    Ok(Value::Object(event))
}

/// Posts alerts to the PagerDuty Events API
pub struct PagerDutyAction {
    events_url: String,
}

impl PagerDutyAction {
    pub fn new() -> Self {
        Self::with_url(PAGERDUTY_EVENTS_URL)
    }

    pub fn with_url(events_url: impl Into<String>) -> Self {
        Self {
            events_url: events_url.into(),
        }
    }
}

impl Default for PagerDutyAction {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertAction for PagerDutyAction {
    fn name(&self) -> &str {
        "pagerduty"
    }

    fn execute(&self, payload: &AlertPayload) -> Result<String, AlertError> {
        let event = build_event(payload)?;
        let request_failed = |e: reqwest::Error| AlertError::Request {
            reason: e.without_url().to_string(),
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(request_failed)?;

        let response = client
            .post(&self.events_url)
            .json(&event)
            .send()
            .map_err(request_failed)?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().unwrap_or_default();
            return Err(AlertError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let ack: Value = response.json().unwrap_or(Value::Null);
        let dedup_key = ack
            .get("dedup_key")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        tracing::info!(dedup_key, "PagerDuty event accepted");
        Ok(format!("PagerDuty event created: {}", dedup_key))
    }
}
