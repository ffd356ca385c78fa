//! Transport Error Types
//!
//! Every failure a transport can report, plus the synchronous admission rejection.

use thiserror::Error;

/// Literal message reported when a response envelope is neither a success nor an error
pub const UNPARSEABLE_RESPONSE: &str = "Unable to parse response";

/// Transport-specific errors
#[derive(Error, Debug)]
pub enum TransportError {
    // Collaborator errors
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Command timeout after {0}ms")]
    CommandTimeout(u64),

    // Protocol errors
    #[error("{0}")]
    Protocol(String),

    #[error("Unable to parse response")]
    MalformedResponse,

    #[error("Invalid login response: {0}")]
    InvalidLogin(String),

    #[error("Request interrupted by error: {0}")]
    Interrupted(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl TransportError {
    /// Message handed to the error hook and recorded as the last error.
    ///
    /// Collaborator and protocol messages pass through untouched.
    pub fn report_message(&self) -> String {
        match self {
            TransportError::CommandFailed(message) | TransportError::Protocol(message) => {
                message.clone()
            }
            TransportError::MalformedResponse => UNPARSEABLE_RESPONSE.to_string(),
            other => other.to_string(),
        }
    }
}

/// Synchronous rejection of a request that was never admitted
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    #[error("A request is already in flight")]
    Busy,

    #[error("No tokio runtime available to dispatch the request")]
    NoRuntime,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::CommandFailed(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::InvalidLogin(err.to_string())
    }
}

impl From<url::ParseError> for TransportError {
    fn from(err: url::ParseError) -> Self {
        TransportError::InvalidConfig(format!("Invalid URL: {}", err))
    }
}

impl From<toml::de::Error> for TransportError {
    fn from(err: toml::de::Error) -> Self {
        TransportError::InvalidConfig(err.to_string())
    }
}

/// Result type alias for transport operations
pub type TransportResult<T> = Result<T, TransportError>;
