use bitsight_api::ApiError;
use thiserror::Error;

/// Failure of one collection call; nothing partial is returned alongside it
#[derive(Debug, Error)]
pub enum CollectError {
    #[error("Invalid endpoint: {name}")]
    UnknownEndpoint { name: String },

    #[error("endpoint {endpoint} needs a value for {placeholder}")]
    UnresolvedPlaceholder {
        endpoint: String,
        placeholder: &'static str,
    },

    #[error("{endpoint}: request to {path} failed: {source}")]
    Request {
        endpoint: String,
        path: String,
        #[source]
        source: ApiError,
    },
}

impl CollectError {
    pub(crate) fn request(endpoint: &str, path: &str, source: ApiError) -> Self {
        CollectError::Request {
            endpoint: endpoint.to_string(),
            path: path.to_string(),
            source,
        }
    }

    /// The underlying API failure, if the error came from the network
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            CollectError::Request { source, .. } => Some(source),
            _ => None,
        }
    }
}
