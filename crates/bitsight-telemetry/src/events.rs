//! Host events built from collected records

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;

pub const DEFAULT_INDEX: &str = "main";

/// One record as handed to the host index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostEvent {
    pub stanza: String,
    pub sourcetype: String,
    pub index: String,
    /// Epoch seconds
    pub time: f64,
    pub event: Value,
}

impl HostEvent {
    /// Wrap collected records of `endpoint` as host events.
    ///
    /// The event time is taken from the record's `_collection_time` stamp.
    pub fn from_records(
        stanza: &str,
        endpoint: &str,
        index: &str,
        records: Vec<Value>,
    ) -> Vec<HostEvent> {
        let sourcetype = sourcetype_for(endpoint);
        let fallback = Utc::now().timestamp_millis() as f64 / 1000.0;

        records
            .into_iter()
            .map(|event| HostEvent {
                stanza: stanza.to_string(),
                sourcetype: sourcetype.clone(),
                index: index.to_string(),
                time: event
                    .get("_collection_time")
                    .and_then(Value::as_f64)
                    .unwrap_or(fallback),
                event,
            })
            .collect()
    }
}

/// `bitsight:<endpoint>` with dashes turned into underscores
pub fn sourcetype_for(endpoint: &str) -> String {
    format!("bitsight:{}", endpoint.replace('-', "_"))
}

/// Write events as JSON lines
pub fn write_events<W: Write>(mut writer: W, events: &[HostEvent]) -> std::io::Result<()> {
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()
}
