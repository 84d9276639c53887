//! Top-level collection: expand, fetch, paginate, annotate

use bitsight_api::{paginate, ApiClient};
use chrono::{DateTime, Local, TimeZone};
use serde_json::{Map, Value};

use crate::catalog::EndpointCatalog;
use crate::context::{ContextTag, ScopingContext};
use crate::expander::Expander;
use crate::CollectError;

/// Drives one endpoint collection against the API
pub struct Collector<'a> {
    client: &'a ApiClient,
    catalog: &'a EndpointCatalog,
}

impl<'a> Collector<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self::with_catalog(client, EndpointCatalog::global())
    }

    pub fn with_catalog(client: &'a ApiClient, catalog: &'a EndpointCatalog) -> Self {
        Self { client, catalog }
    }

    pub fn collect(
        &self,
        endpoint: &str,
        ctx: &ScopingContext,
    ) -> Result<Vec<Value>, CollectError> {
        self.collect_at(endpoint, ctx, &Local::now())
    }

    /// Collect every record of `endpoint`, stamped with `now`.
    ///
    /// Concrete paths are fetched one after another. The first failing
    /// request aborts the call and discards everything gathered so far.
    pub fn collect_at<Tz>(
        &self,
        endpoint: &str,
        ctx: &ScopingContext,
        now: &DateTime<Tz>,
    ) -> Result<Vec<Value>, CollectError>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let expander = Expander::new(self.client, self.catalog);
        let paths = expander.expand_on(endpoint, ctx, now.date_naive())?;
        tracing::info!(endpoint, paths = paths.len(), "starting collection");

        let mut records = Vec::new();
        for concrete in &paths {
            let first = self
                .client
                .execute(&concrete.path)
                .map_err(|e| CollectError::request(endpoint, &concrete.path, e))?;
            let batch = paginate(self.client, first)
                .map_err(|e| CollectError::request(endpoint, &concrete.path, e))?;

            tracing::debug!(path = %concrete.path, records = batch.len(), "fetched");
            records.extend(
                batch
                    .into_iter()
                    .map(|record| tag_record(record, &concrete.tags)),
            );
        }

        stamp_collection(&mut records, now);
        tracing::info!(endpoint, records = records.len(), "collection complete");
        Ok(records)
    }
}

fn into_object(record: Value) -> Map<String, Value> {
    match record {
        Value::Object(object) => object,
        other => {
            let mut object = Map::new();
            object.insert("value".to_string(), other);
            object
        }
    }
}

fn tag_record(record: Value, tags: &[ContextTag]) -> Value {
    let mut object = into_object(record);
    for tag in tags {
        tag.apply(&mut object);
    }
    Value::Object(object)
}

/// Add `_collection_time` (epoch seconds) and `_collection_date` to every
/// record; non-object records are wrapped under `value` first.
pub fn stamp_collection<Tz>(records: &mut [Value], now: &DateTime<Tz>)
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let time = now.timestamp_millis() as f64 / 1000.0;
    let date = now.to_rfc3339();

    for record in records.iter_mut() {
        let mut object = into_object(std::mem::take(record));
        object.insert("_collection_time".to_string(), Value::from(time));
        object.insert("_collection_date".to_string(), Value::from(date.as_str()));
        *record = Value::Object(object);
    }
}
