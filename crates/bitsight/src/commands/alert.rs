use std::path::Path;

use bitsight_alerts::{ActionRegistry, AlertPayload};
use bitsight_telemetry::Paths;

fn dispatch(
    registry: &ActionRegistry,
    action: &str,
    payload_file: &Path,
) -> anyhow::Result<String> {
    let payload = AlertPayload::from_file(payload_file)?;
    Ok(registry.dispatch(action, &payload)?)
}

pub fn run(action: &str, payload_file: &str) -> anyhow::Result<()> {
    let paths = Paths::new()?;
    let registry = ActionRegistry::with_defaults(&paths.scripts_dir());

    let message = dispatch(&registry, action, Path::new(payload_file))?;
    tracing::info!(action, "alert action completed");
    println!("INFO: {}", message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_unreadable_payload() {
        let temp = TempDir::new().unwrap();
        let registry = ActionRegistry::with_defaults(temp.path());
        assert!(dispatch(&registry, "email", &temp.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_unknown_action_rejected() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("payload.json");
        std::fs::write(&file, r#"{"search_name": "s", "configuration": {}}"#).unwrap();

        let registry = ActionRegistry::with_defaults(temp.path());
        let err = dispatch(&registry, "sms", &file).unwrap_err();
        assert_eq!(err.to_string(), "unknown alert action: sms");
    }

    #[test]
    fn test_pagerduty_without_routing_key() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("payload.json");
        std::fs::write(&file, r#"{"configuration": {"summary": "x"}}"#).unwrap();

        let registry = ActionRegistry::with_defaults(temp.path());
        let err = dispatch(&registry, "pagerduty", &file).unwrap_err();
        assert_eq!(err.to_string(), "No PagerDuty routing key configured");
    }
}
