use bitsight_api::{ApiClient, ApiError, Transport};
use serde_json::{json, Value};
use std::collections::HashMap;

pub const BASE: &str = "https://api.test/ratings/v1";

/// Canned API responses keyed by path
pub struct CannedApi {
    routes: HashMap<String, Value>,
}

impl Transport for CannedApi {
    fn get_json(&self, url: &str, _authorization: &str) -> Result<Value, ApiError> {
        let path = url.strip_prefix(BASE).unwrap_or(url);
        self.routes.get(path).cloned().ok_or(ApiError::Http {
            status: 404,
            reason: "Not Found".to_string(),
        })
    }
}

pub fn portfolio_api(companies: usize) -> ApiClient {
    let mut routes = HashMap::new();
    let entries: Vec<Value> = (0..companies)
        .map(|i| json!({"guid": format!("c{}", i), "name": format!("Company {}", i)}))
        .collect();
    routes.insert("/portfolio".to_string(), json!({"companies": entries}));

    for i in 0..companies {
        routes.insert(
            format!("/companies/c{}/findings", i),
            json!({"results": [{"temporary_id": format!("f{}", i), "severity": "minor"}]}),
        );
    }

    ApiClient::with_transport(BASE, "tok", Box::new(CannedApi { routes }))
}
