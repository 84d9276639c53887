//! Registry dispatching alerts to actions by name

use std::path::Path;

use crate::{AlertAction, AlertError, AlertPayload, EmailAction, PagerDutyAction, ScriptAction};

/// Registry for alert actions
pub struct ActionRegistry {
    actions: Vec<Box<dyn AlertAction>>,
}

impl ActionRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Email, PagerDuty and script actions, scripts resolved in `scripts_dir`
    pub fn with_defaults(scripts_dir: &Path) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(EmailAction::new()));
        registry.register(Box::new(PagerDutyAction::new()));
        registry.register(Box::new(ScriptAction::new(scripts_dir)));
        registry
    }

    /// Register an action, replacing any with the same name
    pub fn register(&mut self, action: Box<dyn AlertAction>) {
        self.actions.retain(|a| a.name() != action.name());
        self.actions.push(action);
    }

    pub fn get(&self, name: &str) -> Option<&dyn AlertAction> {
        self.actions
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.as_ref())
    }

    pub fn names(&self) -> Vec<&str> {
        self.actions.iter().map(|a| a.name()).collect()
    }

    /// Run the named action
    pub fn dispatch(&self, name: &str, payload: &AlertPayload) -> Result<String, AlertError> {
        let action = self.get(name).ok_or_else(|| AlertError::UnknownAction {
            name: name.to_string(),
        })?;
        tracing::debug!(action = name, search = %payload.search_name, "dispatching alert");
        action.execute(payload)
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
