use bitsight_api::{ApiClient, ApiError, Transport};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const BASE: &str = "https://api.test/ratings/v1";

/// Serves canned responses keyed by full URL and records every request
#[derive(Default)]
pub struct FakeApi {
    responses: HashMap<String, Result<Value, ApiError>>,
    pub requests: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(format!("{}{}", BASE, path), Ok(body));
        self
    }

    pub fn fail(mut self, path: &str, error: ApiError) -> Self {
        self.responses.insert(format!("{}{}", BASE, path), Err(error));
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for FakeApi {
    fn get_json(&self, url: &str, _authorization: &str) -> Result<Value, ApiError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses.get(url).cloned().unwrap_or_else(|| {
            Err(ApiError::Http {
                status: 404,
                reason: "Not Found".to_string(),
            })
        })
    }
}

pub fn client(api: Arc<FakeApi>) -> ApiClient {
    ApiClient::with_transport(BASE, "tok", Box::new(api))
}
