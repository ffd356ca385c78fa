//! Transport Settings
//!
//! Loaded from a TOML file; CLI flags override individual fields.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::transport::{TransportError, TransportResult, LOGIN_COMMAND};

fn default_timeout_ms() -> u64 {
    30000
}

fn default_login_command() -> String {
    LOGIN_COMMAND.to_string()
}

/// Connection settings for a laboratory backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportSettings {
    /// JSON endpoint of the backend
    pub endpoint: String,
    /// Reservation the commands are bound to
    pub reservation_id: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_login_command")]
    pub login_command: String,
}

impl TransportSettings {
    pub fn new(endpoint: impl Into<String>, reservation_id: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            reservation_id: reservation_id.into(),
            timeout_ms: default_timeout_ms(),
            login_command: default_login_command(),
        }
    }

    /// Load settings from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> TransportResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            TransportError::InvalidConfig(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> TransportResult<Self> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> TransportResult<()> {
        url::Url::parse(&self.endpoint)?;
        if self.reservation_id.trim().is_empty() {
            return Err(TransportError::InvalidConfig(
                "reservation_id must not be empty".to_string(),
            ));
        }
        if self.login_command.is_empty() {
            return Err(TransportError::InvalidConfig(
                "login_command must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
