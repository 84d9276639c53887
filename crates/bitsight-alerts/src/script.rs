//! Runs a local script with the alert payload

use std::io::{Read, Write};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::{AlertAction, AlertError, AlertPayload};

pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(300);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Executes scripts found in one directory
pub struct ScriptAction {
    scripts_dir: PathBuf,
    timeout: Duration,
}

impl ScriptAction {
    pub fn new(scripts_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            timeout: SCRIPT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Only plain relative names inside the scripts directory are accepted
    fn resolve(&self, script_name: &str) -> Result<PathBuf, AlertError> {
        let path = self.scripts_dir.join(script_name);
        let plain = Path::new(script_name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !plain || !path.is_file() {
            return Err(AlertError::ScriptNotFound {
                path: path.display().to_string(),
            });
        }
        Ok(path)
    }

    fn wait(&self, child: &mut std::process::Child) -> Result<ExitStatus, AlertError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if let Some(status) = child.try_wait()? {
                return Ok(status);
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(AlertError::ScriptTimeout);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

impl AlertAction for ScriptAction {
    fn name(&self) -> &str {
        "script"
    }

    fn execute(&self, payload: &AlertPayload) -> Result<String, AlertError> {
        let script_name = payload.setting_or("script_name", "");
        if script_name.is_empty() {
            return Err(AlertError::MissingSetting("No script name configured"));
        }
        let script_path = self.resolve(&script_name)?;

        let mut command = Command::new(&script_path);
        command.args(payload.setting_or("script_args", "").split_whitespace());

        // Removed when dropped at the end of this call
        let payload_file = if payload.flag("pass_payload", true) {
            let mut file = tempfile::Builder::new()
                .prefix("bitsight-alert-")
                .suffix(".json")
                .tempfile()?;
            serde_json::to_writer(&mut file, payload)?;
            file.flush()?;
            command.arg(file.path());
            Some(file)
        } else {
            None
        };

        tracing::debug!(script = %script_path.display(), "running alert script");
        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = self.wait(&mut child)?;
        let stdout = stdout.join().unwrap_or_default();
        let stderr = stderr.join().unwrap_or_default();
        drop(payload_file);

        if !status.success() {
            return Err(AlertError::ScriptFailed {
                code: status.code().unwrap_or(-1),
                stderr: stderr.trim_end().to_string(),
            });
        }
        Ok(format!("Script executed successfully: {}", stdout.trim_end()))
    }
}

fn drain<R: Read + Send + 'static>(reader: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut reader) = reader {
            let _ = reader.read_to_string(&mut text);
        }
        text
    })
}
