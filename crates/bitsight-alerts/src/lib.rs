//! Alert actions fired from saved-search results: email, PagerDuty, script

mod action;
mod email;
mod error;
mod pagerduty;
mod payload;
mod registry;
mod script;

pub use action::AlertAction;
pub use email::{html_body, EmailAction, EmailSettings, Priority};
pub use error::AlertError;
pub use pagerduty::{build_event, PagerDutyAction, PAGERDUTY_EVENTS_URL};
pub use payload::{substitute_variables, AlertPayload};
pub use registry::ActionRegistry;
pub use script::{ScriptAction, SCRIPT_TIMEOUT};
