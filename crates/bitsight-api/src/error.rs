use thiserror::Error;

/// Failure of a single API request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The API answered with a 4xx/5xx status
    #[error("HTTP Error {status}: {reason}")]
    Http { status: u16, reason: String },

    /// DNS, connect, TLS or timeout failure before a status was received
    #[error("network error: {reason}")]
    Network { reason: String },

    /// The body could not be decoded as JSON
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },

    /// The HTTP client could not be built from the supplied settings
    #[error("invalid client settings: {reason}")]
    InvalidSettings { reason: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the remote end was reached and answered
    pub fn is_http(&self) -> bool {
        matches!(self, ApiError::Http { .. })
    }
}
