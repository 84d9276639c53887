//! Turning a logical endpoint into the concrete paths to fetch

use bitsight_api::ApiClient;
use chrono::{Days, Local, NaiveDate};

use crate::catalog::{EndpointCatalog, COUNTRY_GUID, GUID, OBSERVATION_ID, USER_GUID};
use crate::context::{ConcretePath, ContextTag, ScopingContext};
use crate::resolver::{self, PORTFOLIO_PATH, USERS_PATH};
use crate::CollectError;

/// Resolves path templates against explicit identifiers or discovered entities
pub struct Expander<'a> {
    client: &'a ApiClient,
    catalog: &'a EndpointCatalog,
}

impl<'a> Expander<'a> {
    pub fn new(client: &'a ApiClient, catalog: &'a EndpointCatalog) -> Self {
        Self { client, catalog }
    }

    /// Expand using today's local date for history ranges
    pub fn expand(
        &self,
        endpoint: &str,
        ctx: &ScopingContext,
    ) -> Result<Vec<ConcretePath>, CollectError> {
        self.expand_on(endpoint, ctx, Local::now().date_naive())
    }

    /// Expand with an explicit "today".
    ///
    /// `{user_guid}` is resolved before `{guid}`/`{country_guid}`; each
    /// resolves from the context when given (single path, no tag) or fans
    /// out over all users/companies (one tagged path per entity, in API
    /// order). Query augmentation is applied to every resulting path.
    pub fn expand_on(
        &self,
        endpoint: &str,
        ctx: &ScopingContext,
        today: NaiveDate,
    ) -> Result<Vec<ConcretePath>, CollectError> {
        let template = self
            .catalog
            .template(endpoint)
            .ok_or_else(|| CollectError::UnknownEndpoint {
                name: endpoint.to_string(),
            })?;

        let mut template = template.to_string();
        if template.contains(OBSERVATION_ID) {
            let id = ctx.observation_id.as_deref().ok_or_else(|| {
                CollectError::UnresolvedPlaceholder {
                    endpoint: endpoint.to_string(),
                    placeholder: OBSERVATION_ID,
                }
            })?;
            template = template.replace(OBSERVATION_ID, id);
        }

        let mut paths = vec![ConcretePath::untagged(template)];

        if paths[0].path.contains(USER_GUID) {
            paths = match ctx.user_guid.as_deref() {
                Some(user) => substitute(paths, &[USER_GUID], user),
                None => {
                    let users = resolver::resolve_users(self.client)
                        .map_err(|e| CollectError::request(endpoint, USERS_PATH, e))?;
                    let tags = users.into_iter().map(|u| ContextTag::User {
                        guid: u.guid,
                        email: u.display,
                    });
                    fan_out(paths, &[USER_GUID], tags.collect())
                }
            };
        }

        let needs_company = paths
            .iter()
            .any(|p| p.path.contains(GUID) || p.path.contains(COUNTRY_GUID));
        let mut per_company = false;

        if needs_company {
            paths = match ctx.company_guid.as_deref() {
                Some(company) => substitute(paths, &[GUID, COUNTRY_GUID], company),
                None => {
                    let companies = resolver::resolve_companies(self.client)
                        .map_err(|e| CollectError::request(endpoint, PORTFOLIO_PATH, e))?;
                    per_company = true;
                    let tags = companies.into_iter().map(|c| ContextTag::Company {
                        guid: c.guid,
                        name: c.display,
                    });
                    fan_out(paths, &[GUID, COUNTRY_GUID], tags.collect())
                }
            };
        }

        if endpoint.contains("findings") && !ctx.risk_vectors.is_empty() {
            let filter = format!("risk_vector={}", ctx.risk_vectors.join(","));
            for concrete in &mut paths {
                append_query(&mut concrete.path, &filter);
            }
        }

        if endpoint.contains("history") && per_company {
            let range = history_range(today, ctx.days_back);
            for concrete in &mut paths {
                append_query(&mut concrete.path, &range);
            }
        }

        tracing::debug!(endpoint, paths = paths.len(), "expanded endpoint");
        Ok(paths)
    }
}

fn substitute(paths: Vec<ConcretePath>, placeholders: &[&str], value: &str) -> Vec<ConcretePath> {
    paths
        .into_iter()
        .map(|mut concrete| {
            for placeholder in placeholders {
                concrete.path = concrete.path.replace(*placeholder, value);
            }
            concrete
        })
        .collect()
}

fn fan_out(
    paths: Vec<ConcretePath>,
    placeholders: &[&str],
    entities: Vec<ContextTag>,
) -> Vec<ConcretePath> {
    let mut expanded = Vec::with_capacity(paths.len() * entities.len());
    for concrete in &paths {
        for tag in &entities {
            let mut path = concrete.path.clone();
            for placeholder in placeholders {
                path = path.replace(*placeholder, tag.guid());
            }
            let mut tags = concrete.tags.clone();
            tags.push(tag.clone());
            expanded.push(ConcretePath { path, tags });
        }
    }
    expanded
}

/// Append `param` with `?` or `&` depending on whether a query exists
fn append_query(path: &mut String, param: &str) {
    path.push(if path.contains('?') { '&' } else { '?' });
    path.push_str(param);
}

fn history_range(today: NaiveDate, days_back: u32) -> String {
    let start = today
        .checked_sub_days(Days::new(u64::from(days_back)))
        .unwrap_or(NaiveDate::MIN);
    format!(
        "start={}&end={}",
        start.format("%Y-%m-%d"),
        today.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_query_separator() {
        let mut path = "/companies/x/findings".to_string();
        append_query(&mut path, "a=1");
        append_query(&mut path, "b=2");
        assert_eq!(path, "/companies/x/findings?a=1&b=2");
    }

    #[test]
    fn test_history_range_crosses_leap_day() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(history_range(today, 30), "start=2024-02-14&end=2024-03-15");
        assert_eq!(history_range(today, 0), "start=2024-03-15&end=2024-03-15");
    }

    #[test]
    fn test_fan_out_keeps_entity_order() {
        let tags = vec![
            ContextTag::Company {
                guid: "b".into(),
                name: "B".into(),
            },
            ContextTag::Company {
                guid: "a".into(),
                name: "A".into(),
            },
        ];
        let paths = fan_out(
            vec![ConcretePath::untagged("/companies/{guid}/assets")],
            &[GUID, COUNTRY_GUID],
            tags,
        );
        let rendered: Vec<&str> = paths.iter().map(|p| p.path.as_str()).collect();
        assert_eq!(rendered, vec!["/companies/b/assets", "/companies/a/assets"]);
        assert_eq!(paths[0].tags[0].guid(), "b");
    }
}
