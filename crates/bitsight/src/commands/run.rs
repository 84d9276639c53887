use anyhow::Context;
use bitsight_api::ApiClient;
use bitsight_core::{Collector, InputConfig, Settings};
use bitsight_telemetry::{append_jsonl, HostEvent, Paths};

/// Outcome of one pass over the configured inputs
#[derive(Debug, Default)]
struct RunSummary {
    succeeded: usize,
    events: usize,
    failed: Vec<String>,
}

fn collect_input(
    client: &ApiClient,
    input: &InputConfig,
    settings: &Settings,
    paths: &Paths,
) -> anyhow::Result<usize> {
    input.validate(settings)?;

    let ctx = input.scoping_context(&settings.collection);
    let records = Collector::new(client).collect(&input.endpoint, &ctx)?;
    let events = HostEvent::from_records(&input.name, &input.endpoint, &input.index, records);

    let file = paths.events_file(&input.name);
    append_jsonl(&file, &events)
        .with_context(|| format!("failed to write events to {}", file.display()))?;
    Ok(events.len())
}

/// Collect each enabled input; a failing input is logged and skipped
fn run_inputs(client: &ApiClient, settings: &Settings, paths: &Paths) -> RunSummary {
    let mut summary = RunSummary::default();

    for input in settings.enabled_inputs() {
        match collect_input(client, input, settings, paths) {
            Ok(count) => {
                tracing::info!(
                    input = %input.name,
                    endpoint = %input.endpoint,
                    events = count,
                    "input collected"
                );
                summary.succeeded += 1;
                summary.events += count;
            }
            Err(e) => {
                tracing::error!(
                    input = %input.name,
                    endpoint = %input.endpoint,
                    "input failed: {:#}",
                    e
                );
                summary.failed.push(input.name.clone());
            }
        }
    }

    summary
}

pub fn run() -> anyhow::Result<()> {
    let (paths, settings) = super::load_settings()?;
    if settings.enabled_inputs().next().is_none() {
        println!("No enabled inputs in {}", paths.config_file().display());
        return Ok(());
    }

    let client = super::api_client(&settings)?;
    let summary = run_inputs(&client, &settings, &paths);

    println!(
        "{} input(s) collected, {} event(s) written to {}",
        summary.succeeded,
        summary.events,
        paths.events_dir().display()
    );
    if !summary.failed.is_empty() {
        anyhow::bail!("failed inputs: {}", summary.failed.join(", "));
    }
    Ok(())
}
