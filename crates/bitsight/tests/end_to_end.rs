mod common;

use bitsight_core::{Collector, InputConfig, ScopingContext, Settings};
use bitsight_telemetry::{append_jsonl, read_jsonl, HostEvent, Paths, HOME_ENV};
use serial_test::serial;
use tempfile::TempDir;

#[test]
fn test_portfolio_findings_to_event_file() {
    let temp = TempDir::new().unwrap();
    let paths = Paths::with_root(temp.path());
    let client = common::portfolio_api(3);

    let records = Collector::new(&client)
        .collect("findings", &ScopingContext::new())
        .unwrap();
    let events = HostEvent::from_records("findings-daily", "findings", "security", records);
    append_jsonl(&paths.events_file("findings-daily"), &events).unwrap();

    let written: Vec<HostEvent> = read_jsonl(&paths.events_file("findings-daily")).unwrap();
    assert_eq!(written.len(), 3);
    assert!(written.iter().all(|e| e.sourcetype == "bitsight:findings"));
    assert_eq!(written[2].event["company_guid"], "c2");
    assert_eq!(written[2].event["company_name"], "Company 2");

    let stamp = &written[0].event["_collection_time"];
    assert!(written.iter().all(|e| &e.event["_collection_time"] == stamp));
    assert_eq!(written[0].time, stamp.as_f64().unwrap());
}

#[test]
fn test_configured_input_drives_collection() {
    let client = common::portfolio_api(2);
    let mut input = InputConfig::new("findings-spf", "findings");
    input.company_guid = Some("c1".to_string());

    let ctx = input.scoping_context(&Settings::default().collection);
    let records = Collector::new(&client).collect(&input.endpoint, &ctx).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["temporary_id"], "f1");
}

#[test]
#[serial]
fn test_settings_live_under_bitsight_home() {
    let temp = TempDir::new().unwrap();
    std::env::set_var(HOME_ENV, temp.path());

    let paths = Paths::new().unwrap();
    let mut settings = Settings::default();
    settings.api.api_token = "tok".to_string();
    settings.inputs.push(InputConfig::new("alerts", "alerts"));
    settings.save(&paths.config_file()).unwrap();

    let loaded = Settings::load(&temp.path().join("config.json")).unwrap();
    std::env::remove_var(HOME_ENV);

    assert_eq!(loaded.inputs.len(), 1);
    assert_eq!(loaded.api.api_token, "tok");
}
