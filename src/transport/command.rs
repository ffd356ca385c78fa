//! Command Sender Abstraction
//!
//! The collaborator that actually reaches the backend: send one command
//! string, get one response string or a failure.

use async_trait::async_trait;

use super::error::TransportResult;

/// Literal command that opens a session
pub const LOGIN_COMMAND: &str = "login";

/// Command sender trait - defines the interface for all backend channels
#[async_trait]
pub trait CommandSender: Send + Sync {
    /// Send a command and wait for the raw response
    async fn send_command(&self, command: &str) -> TransportResult<String>;

    /// Get sender type name for logging
    fn sender_type(&self) -> &'static str;
}
