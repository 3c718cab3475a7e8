use crate::filters::UnknownFilterError;

/// Errors returned by the searchcode client
#[derive(Debug, thiserror::Error)]
pub enum SearchcodeError {
    #[error(transparent)]
    UnknownFilter(#[from] UnknownFilterError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request to {endpoint} failed with HTTP {status}")]
    Request { status: u16, endpoint: String },

    /// The body was not valid JSON. `body` holds the raw payload as received.
    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected response from {endpoint}: expected {expected}, got {found}")]
    UnexpectedShape {
        endpoint: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type Result<T, E = SearchcodeError> = std::result::Result<T, E>;
