use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("failed to read payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("unknown alert action: {name}")]
    UnknownAction { name: String },

    #[error("{0}")]
    MissingSetting(&'static str),

    #[error("PagerDuty request failed: {reason}")]
    Request { reason: String },

    #[error("PagerDuty returned status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Script not found: {path}")]
    ScriptNotFound { path: String },

    #[error("Script exited with code {code}: {stderr}")]
    ScriptFailed { code: i32, stderr: String },

    #[error("Script execution timed out")]
    ScriptTimeout,

    #[error("invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to send email: {reason}")]
    Email { reason: String },
}
