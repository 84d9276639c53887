//! Caller scoping and per-path entity tags

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identifiers and filters narrowing one collection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopingContext {
    pub company_guid: Option<String>,
    pub user_guid: Option<String>,
    pub observation_id: Option<String>,
    pub risk_vectors: Vec<String>,
    pub days_back: u32,
}

impl ScopingContext {
    pub const DEFAULT_DAYS_BACK: u32 = 365;

    pub fn new() -> Self {
        Self {
            company_guid: None,
            user_guid: None,
            observation_id: None,
            risk_vectors: Vec::new(),
            days_back: Self::DEFAULT_DAYS_BACK,
        }
    }

    pub fn with_company(mut self, guid: impl Into<String>) -> Self {
        self.company_guid = non_empty(guid.into());
        self
    }

    pub fn with_user(mut self, guid: impl Into<String>) -> Self {
        self.user_guid = non_empty(guid.into());
        self
    }

    pub fn with_observation(mut self, id: impl Into<String>) -> Self {
        self.observation_id = non_empty(id.into());
        self
    }

    pub fn with_risk_vectors<I, S>(mut self, vectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.risk_vectors = vectors
            .into_iter()
            .map(Into::into)
            .filter(|v: &String| !v.is_empty())
            .collect();
        self
    }

    pub fn with_days_back(mut self, days_back: u32) -> Self {
        self.days_back = days_back;
        self
    }
}

impl Default for ScopingContext {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a comma-separated risk vector list, dropping blanks
pub fn parse_risk_vectors(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Entity a concrete path was expanded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextTag {
    Company { guid: String, name: String },
    User { guid: String, email: String },
}

impl ContextTag {
    pub fn guid(&self) -> &str {
        match self {
            ContextTag::Company { guid, .. } | ContextTag::User { guid, .. } => guid,
        }
    }

    /// Copy the entity identifier and display field onto a record
    pub fn apply(&self, record: &mut Map<String, Value>) {
        match self {
            ContextTag::Company { guid, name } => {
                record.insert("company_guid".to_string(), Value::from(guid.as_str()));
                record.insert("company_name".to_string(), Value::from(name.as_str()));
            }
            ContextTag::User { guid, email } => {
                record.insert("user_guid".to_string(), Value::from(guid.as_str()));
                record.insert("user_email".to_string(), Value::from(email.as_str()));
            }
        }
    }
}

/// One HTTP path to fetch, with the entities it was expanded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcretePath {
    pub path: String,
    pub tags: Vec<ContextTag>,
}

impl ConcretePath {
    pub fn untagged(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tags: Vec::new(),
        }
    }

    pub fn is_tagged(&self) -> bool {
        !self.tags.is_empty()
    }
}
