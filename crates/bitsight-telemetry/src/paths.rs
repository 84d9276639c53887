//! Path resolution for local collector state

use std::path::PathBuf;

/// Overrides the state directory (defaults to `~/.bitsight`)
pub const HOME_ENV: &str = "BITSIGHT_HOME";

/// Resolves standard paths for configuration, events and reports
#[derive(Debug, Clone)]
pub struct Paths {
    pub root: PathBuf,
}

impl Paths {
    /// Resolve the state directory from `BITSIGHT_HOME` or the home directory
    pub fn new() -> std::io::Result<Self> {
        if let Some(root) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_root(root));
        }

        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "home directory not found")
        })?;

        Ok(Self::with_root(home.join(".bitsight")))
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get config.json path
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Get events directory path
    pub fn events_dir(&self) -> PathBuf {
        self.root.join("events")
    }

    /// JSONL file receiving events of one input
    pub fn events_file(&self, input_name: &str) -> PathBuf {
        let safe = input_name.replace(['/', '\\', ' ', ':'], "_");
        self.events_dir().join(format!("{}.jsonl", safe))
    }

    /// Get validation.json path
    pub fn validation_file(&self) -> PathBuf {
        self.root.join("validation.json")
    }

    /// Directory searched for alert scripts
    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }
}
