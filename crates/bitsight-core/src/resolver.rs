//! Discovery of the companies and users an endpoint can be expanded over

use bitsight_api::{paginate, ApiClient, ApiError};
use serde_json::Value;

pub const PORTFOLIO_PATH: &str = "/portfolio";
pub const USERS_PATH: &str = "/users";

/// A company or user, reduced to its identifier and display field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub guid: String,
    /// Company name or user email
    pub display: String,
}

impl Entity {
    fn from_record(record: &Value, display_field: &str) -> Option<Self> {
        let guid = record.get("guid")?.as_str()?;
        if guid.is_empty() {
            return None;
        }
        let display = record
            .get(display_field)
            .and_then(Value::as_str)
            .unwrap_or_default();
        Some(Self {
            guid: guid.to_string(),
            display: display.to_string(),
        })
    }
}

/// Every company in the portfolio, in API order
pub fn resolve_companies(client: &ApiClient) -> Result<Vec<Entity>, ApiError> {
    resolve(client, PORTFOLIO_PATH, "name")
}

/// Every user of the account, in API order
pub fn resolve_users(client: &ApiClient) -> Result<Vec<Entity>, ApiError> {
    resolve(client, USERS_PATH, "email")
}

fn resolve(client: &ApiClient, path: &str, display_field: &str) -> Result<Vec<Entity>, ApiError> {
    let first = client.execute(path)?;
    let records = paginate(client, first)?;
    let total = records.len();

    let entities: Vec<Entity> = records
        .iter()
        .filter_map(|record| Entity::from_record(record, display_field))
        .collect();

    if entities.len() < total {
        tracing::debug!(
            path,
            skipped = total - entities.len(),
            "entities without a guid skipped"
        );
    }
    tracing::debug!(path, entities = entities.len(), "resolved entities");
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitsight_api::Transport;
    use serde_json::json;

    struct Fixed(Value);

    impl Transport for Fixed {
        fn get_json(&self, _url: &str, _authorization: &str) -> Result<Value, ApiError> {
            Ok(self.0.clone())
        }
    }

    fn client(body: Value) -> ApiClient {
        ApiClient::with_transport("https://api.test", "tok", Box::new(Fixed(body)))
    }

    #[test]
    fn test_companies_from_portfolio_object() {
        let body = json!({
            "links": {"next": null},
            "companies": [
                {"guid": "c1", "name": "Acme"},
                {"guid": "c2", "name": "Globex"}
            ]
        });
        let companies = resolve_companies(&client(body)).unwrap();
        assert_eq!(
            companies,
            vec![
                Entity {
                    guid: "c1".into(),
                    display: "Acme".into(),
                },
                Entity {
                    guid: "c2".into(),
                    display: "Globex".into(),
                },
            ]
        );
    }

    #[test]
    fn test_users_from_bare_array() {
        let body = json!([{"guid": "u1", "email": "a@example.com"}, {"guid": "u2"}]);
        let users = resolve_users(&client(body)).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].display, "a@example.com");
        assert_eq!(users[1].display, "");
    }

    #[test]
    fn test_users_under_results_key() {
        let body = json!({"results": [{"guid": "u1", "email": "a@example.com"}]});
        assert_eq!(resolve_users(&client(body)).unwrap().len(), 1);
    }

    #[test]
    fn test_records_without_guid_are_skipped() {
        let body = json!({
            "companies": [{"name": "No Guid"}, {"guid": "", "name": "Blank"}, {"guid": "c3"}]
        });
        let companies = resolve_companies(&client(body)).unwrap();
        assert_eq!(companies.len(), 1);
        assert_eq!(companies[0].guid, "c3");
    }
}
