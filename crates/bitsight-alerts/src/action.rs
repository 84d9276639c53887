use crate::{AlertError, AlertPayload};

/// One way of delivering an alert
pub trait AlertAction {
    /// Name the action is dispatched by
    fn name(&self) -> &str;

    /// Deliver the alert, returning a short success message
    fn execute(&self, payload: &AlertPayload) -> Result<String, AlertError>;
}
