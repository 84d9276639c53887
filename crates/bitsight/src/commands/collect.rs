use std::path::Path;

use anyhow::Context;
use bitsight_api::ApiClient;
use bitsight_core::{parse_risk_vectors, Collector, EndpointCatalog, ScopingContext, Settings};
use bitsight_telemetry::{append_jsonl, write_events, HostEvent};

use crate::cli::CollectArgs;

/// Command-line scoping, falling back to the configured history depth
fn scoping_context(args: &CollectArgs, settings: &Settings) -> ScopingContext {
    let mut ctx = ScopingContext::new()
        .with_days_back(args.days_back.unwrap_or(settings.collection.days_back));
    if let Some(guid) = &args.company_guid {
        ctx = ctx.with_company(guid.as_str());
    }
    if let Some(guid) = &args.user_guid {
        ctx = ctx.with_user(guid.as_str());
    }
    if let Some(id) = &args.observation_id {
        ctx = ctx.with_observation(id.as_str());
    }
    if let Some(vectors) = &args.risk_vectors {
        ctx = ctx.with_risk_vectors(parse_risk_vectors(vectors));
    }
    ctx
}

fn collect_events(
    client: &ApiClient,
    args: &CollectArgs,
    settings: &Settings,
) -> anyhow::Result<Vec<HostEvent>> {
    let ctx = scoping_context(args, settings);
    let records = Collector::new(client).collect(&args.endpoint, &ctx)?;
    Ok(HostEvent::from_records(
        &args.endpoint,
        &args.endpoint,
        &args.index,
        records,
    ))
}

pub fn run(args: &CollectArgs) -> anyhow::Result<()> {
    if !EndpointCatalog::global().contains(&args.endpoint) {
        anyhow::bail!("Invalid endpoint: {}", args.endpoint);
    }

    let (_, settings) = super::load_settings()?;
    let client = super::api_client(&settings)?;
    let events = collect_events(&client, args, &settings)?;

    match &args.output {
        Some(file) => {
            append_jsonl(Path::new(file), &events)
                .with_context(|| format!("failed to write events to {}", file))?;
            tracing::info!(events = events.len(), output = %file, "events written");
        }
        None => write_events(std::io::stdout().lock(), &events)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitsight_api::{ApiError, Transport};
    use serde_json::{json, Value};

    struct Fixed(Value);

    impl Transport for Fixed {
        fn get_json(&self, _url: &str, _authorization: &str) -> Result<Value, ApiError> {
            Ok(self.0.clone())
        }
    }

    fn args(endpoint: &str) -> CollectArgs {
        CollectArgs {
            endpoint: endpoint.to_string(),
            company_guid: None,
            user_guid: None,
            observation_id: None,
            risk_vectors: None,
            days_back: None,
            index: "security".to_string(),
            output: None,
        }
    }

    #[test]
    fn test_scoping_from_args() {
        let mut args = args("findings");
        args.company_guid = Some("c1".to_string());
        args.risk_vectors = Some("spf, dkim".to_string());

        let mut settings = Settings::default();
        settings.collection.days_back = 90;

        let ctx = scoping_context(&args, &settings);
        assert_eq!(ctx.company_guid.as_deref(), Some("c1"));
        assert_eq!(ctx.risk_vectors, vec!["spf", "dkim"]);
        assert_eq!(ctx.days_back, 90);

        args.days_back = Some(7);
        assert_eq!(scoping_context(&args, &settings).days_back, 7);
    }

    #[test]
    fn test_collect_events_shapes_records() {
        let client = ApiClient::with_transport(
            "https://api.test",
            "tok",
            Box::new(Fixed(json!({"results": [{"id": 1}, {"id": 2}]}))),
        );

        let events = collect_events(&client, &args("alerts"), &Settings::default()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sourcetype, "bitsight:alerts");
        assert_eq!(events[0].index, "security");
        assert_eq!(events[1].event["id"], 2);
        assert!(events[0].event.get("_collection_time").is_some());
    }

    #[test]
    fn test_run_rejects_unknown_endpoint() {
        let err = run(&args("nope")).unwrap_err();
        assert_eq!(err.to_string(), "Invalid endpoint: nope");
    }
}
