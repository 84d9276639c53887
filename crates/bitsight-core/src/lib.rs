//! Endpoint expansion and collection over the BitSight ratings API

mod catalog;
mod config;
mod context;
mod error;
mod expander;
mod orchestrator;
pub mod resolver;

pub use catalog::{
    is_known_risk_vector, EndpointCatalog, COUNTRY_GUID, GUID, OBSERVATION_ID, RISK_VECTORS,
    USER_GUID,
};
pub use config::{
    ApiSettings, CollectionSettings, InputConfig, LoggingSettings, Settings, SettingsError,
    SECRET_MASK, TOKEN_ENV,
};
pub use context::{parse_risk_vectors, ConcretePath, ContextTag, ScopingContext};
pub use error::CollectError;
pub use expander::Expander;
pub use orchestrator::{stamp_collection, Collector};
pub use resolver::Entity;
