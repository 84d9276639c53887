//! Following `links.next` continuation pointers

use std::collections::HashSet;

use serde_json::Value;

use crate::client::ApiClient;
use crate::results::{split_page, Page};
use crate::ApiError;

/// Expand a first page into the full, ordered record list.
///
/// A bare array is returned as-is; an object without a recognizable result
/// key is a single record and is never paginated. Otherwise continuation
/// pointers are followed with the client's credentials until none remains.
/// A failed follow-up fetch fails the whole call; pages already read are
/// dropped.
pub fn paginate(client: &ApiClient, first_page: Value) -> Result<Vec<Value>, ApiError> {
    let (mut records, mut next) = match split_page(first_page) {
        Page::Single(record) => return Ok(vec![record]),
        Page::Records { items, next } => (items, next),
    };

    let mut seen = HashSet::new();
    let mut pages = 1usize;

    while let Some(url) = next.take() {
        if !seen.insert(url.clone()) {
            tracing::warn!(url = %url, "continuation pointer repeats, stopping pagination");
            break;
        }

        let page = client.fetch_url(&url)?;
        pages += 1;

        match split_page(page) {
            Page::Records { items, next: following } => {
                records.extend(items);
                next = following;
            }
            Page::Single(_) => {
                tracing::warn!(url = %url, "follow-up page carried no result list");
            }
        }
    }

    tracing::debug!(pages, records = records.len(), "pagination complete");
    Ok(records)
}
