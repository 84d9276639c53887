//! Locating the result list inside a response page

use serde_json::{Map, Value};

/// Keys that may carry the result list of a page, in lookup order
pub const RESULT_KEYS: [&str; 4] = ["results", "companies", "alerts", "users"];

/// A response page split into its records and continuation pointer
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Page {
    Records {
        items: Vec<Value>,
        next: Option<String>,
    },
    /// Object without a known result key; the object is the record
    Single(Value),
}

fn results_key(object: &Map<String, Value>) -> Option<&'static str> {
    RESULT_KEYS
        .iter()
        .copied()
        .find(|key| object.get(*key).is_some_and(Value::is_array))
}

/// Borrow the result list of a page: the page itself when it is an array,
/// otherwise the first array found under [`RESULT_KEYS`].
pub fn results_of(page: &Value) -> Option<&[Value]> {
    match page {
        Value::Array(items) => Some(items.as_slice()),
        Value::Object(object) => {
            let key = results_key(object)?;
            object.get(key).and_then(Value::as_array).map(Vec::as_slice)
        }
        _ => None,
    }
}

/// The `links.next` continuation URL, if present and non-empty
pub fn next_link(page: &Value) -> Option<&str> {
    page.pointer("/links/next")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
}

pub(crate) fn split_page(page: Value) -> Page {
    match page {
        Value::Array(items) => Page::Records { items, next: None },
        Value::Object(mut object) => {
            let Some(key) = results_key(&object) else {
                return Page::Single(Value::Object(object));
            };
            let next = object
                .get("links")
                .and_then(|links| links.get("next"))
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty())
                .map(str::to_string);
            let items = match object.remove(key) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            Page::Records { items, next }
        }
        other => Page::Single(other),
    }
}
