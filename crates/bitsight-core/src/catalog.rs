//! Logical endpoint names and their API path templates

use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const GUID: &str = "{guid}";
pub const COUNTRY_GUID: &str = "{country_guid}";
pub const USER_GUID: &str = "{user_guid}";
pub const OBSERVATION_ID: &str = "{observation_id}";

static CATALOG: OnceLock<EndpointCatalog> = OnceLock::new();

const ENDPOINTS: &[(&str, &str)] = &[
    // Portfolio & companies
    ("portfolio", "/portfolio"),
    ("company-details", "/companies/{guid}"),
    ("country-details", "/companies/{country_guid}"),
    ("company-search", "/companies/search"),
    ("rating-distribution", "/companies/distribution"),
    ("trending-companies", "/companies/search/trending"),
    ("ratings-tree", "/companies/{guid}/company-tree"),
    (
        "company-requests-summary",
        "/companies/infrastructure/requests/summaries",
    ),
    // Ratings & history
    ("current-ratings", "/ratings/v1/companies/{guid}"),
    ("ratings-history", "/companies/{guid}/history/ratings"),
    (
        "ratings-history-csv",
        "/companies/{guid}/reports/ratings-history",
    ),
    ("grade-history", "/companies/{guid}/history/grade"),
    // Findings
    ("findings", "/companies/{guid}/findings"),
    ("findings-summary", "/companies/{guid}/findings/summary"),
    ("findings-summaries", "/companies/{guid}/findings/summaries"),
    ("findings-statistics", "/companies/{guid}/findings/statistics"),
    (
        "finding-comments",
        "/companies/{guid}/findings/{observation_id}/comments",
    ),
    ("observations", "/companies/{guid}/observations"),
    // Risk vectors
    ("risk-vectors", "/companies/{guid}/risk-vectors"),
    (
        "risk-vectors-summary",
        "/companies/{guid}/risk-vectors/summaries",
    ),
    // Statistics
    (
        "diligence-statistics",
        "/companies/{guid}/diligence/statistics",
    ),
    (
        "diligence-historical",
        "/companies/{guid}/diligence/historical-statistics",
    ),
    (
        "industry-statistics",
        "/companies/{guid}/industries/statistics",
    ),
    (
        "user-behavior-statistics",
        "/companies/{guid}/user-behavior/statistics",
    ),
    (
        "observations-statistics",
        "/companies/{guid}/observations/statistics",
    ),
    // Assets & infrastructure
    ("assets", "/companies/{guid}/assets"),
    ("assets-summaries", "/companies/{guid}/assets/summaries"),
    ("asset-risk-matrix", "/companies/{guid}/assets/statistics"),
    ("infrastructure", "/companies/{guid}/infrastructure"),
    (
        "infrastructure-changes",
        "/companies/{guid}/infrastructure/changes",
    ),
    ("infrastructure-tags", "/companies/{guid}/tags"),
    ("ip-by-country", "/companies/{guid}/countries"),
    // Fourth party / supply chain
    ("service-providers", "/companies/{guid}/providers"),
    ("products", "/companies/{guid}/products"),
    (
        "company-tree-providers",
        "/companies/{guid}/company-tree/providers",
    ),
    (
        "company-tree-products",
        "/companies/{guid}/company-tree/products",
    ),
    // Users
    ("users", "/users"),
    ("user-details", "/users/{user_guid}"),
    ("user-quota", "/users/quota"),
    ("user-company-views", "/users/{user_guid}/company-views"),
    // Alerts & threats
    ("alerts", "/alerts"),
    ("exposed-credentials", "/exposed-credentials"),
    ("threats", "/threats"),
    // Organization
    ("folders", "/folders"),
    ("tiers", "/tiers"),
    ("subscriptions", "/subscriptions"),
    ("industries", "/industries"),
    // Peer analytics
    (
        "peer-analytics",
        "/companies/{guid}/peer-analytics/peer-group/count",
    ),
    // Reports & regulatory
    ("nist-csf-report", "/companies/{guid}/regulatory/nist"),
    (
        "preview-report",
        "/companies/{guid}/reports/company-preview",
    ),
];

/// Risk vectors accepted by the findings filter
pub const RISK_VECTORS: [&str; 21] = [
    "botnet_infections",
    "spam_propagation",
    "malware_servers",
    "unsolicited_comm",
    "potentially_exploited",
    "spf",
    "dkim",
    "ssl_certificates",
    "ssl_configurations",
    "open_ports",
    "web_appsec",
    "patching_cadence",
    "insecure_systems",
    "server_software",
    "desktop_software",
    "mobile_software",
    "dnssec",
    "mobile_application_security",
    "application_security",
    "dmarc",
    "file_sharing",
];

pub fn is_known_risk_vector(name: &str) -> bool {
    RISK_VECTORS.contains(&name)
}

/// Immutable mapping from logical endpoint name to path template
#[derive(Debug, Clone)]
pub struct EndpointCatalog {
    templates: BTreeMap<String, String>,
}

impl EndpointCatalog {
    /// Process-wide catalog of every supported endpoint
    pub fn global() -> &'static EndpointCatalog {
        CATALOG.get_or_init(|| {
            Self::from_entries(
                ENDPOINTS
                    .iter()
                    .map(|(name, template)| (name.to_string(), template.to_string())),
            )
        })
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            templates: entries.into_iter().collect(),
        }
    }

    pub fn template(&self, endpoint: &str) -> Option<&str> {
        self.templates.get(endpoint).map(String::as_str)
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.templates.contains_key(endpoint)
    }

    /// Endpoint names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates
            .iter()
            .map(|(name, template)| (name.as_str(), template.as_str()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
