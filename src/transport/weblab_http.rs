//! WebLab JSON Command Sender
//!
//! Sends commands to a laboratory backend through its JSON endpoint.
//! Every command rides a `send_command` call bound to a reservation.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use url::Url;

use super::command::CommandSender;
use super::error::{TransportError, TransportResult};

#[derive(Debug, Serialize)]
struct ReservationId<'a> {
    id: &'a str,
}

#[derive(Debug, Serialize)]
struct CommandString<'a> {
    commandstring: &'a str,
}

#[derive(Debug, Serialize)]
struct SendCommandParams<'a> {
    reservation_id: ReservationId<'a>,
    command: CommandString<'a>,
}

#[derive(Debug, Serialize)]
struct SendCommandCall<'a> {
    method: &'static str,
    params: SendCommandParams<'a>,
}

/// Reply envelope of the JSON endpoint
#[derive(Debug, Deserialize)]
struct JsonReply {
    #[serde(default)]
    is_exception: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    result: Option<CommandReply>,
}

#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    commandstring: Option<String>,
}

/// HTTP command sender bound to one reservation
pub struct WebLabHttpSender {
    client: Client,
    endpoint: Url,
    reservation_id: String,
    timeout_ms: u64,
}

impl WebLabHttpSender {
    /// Create a new sender for the given JSON endpoint and reservation
    pub fn new(
        endpoint: impl Into<String>,
        reservation_id: impl Into<String>,
        timeout_ms: u64,
    ) -> TransportResult<Self> {
        let endpoint_str = endpoint.into();
        let endpoint = Url::parse(&endpoint_str)?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| TransportError::InvalidConfig(e.to_string()))?;

        info!("WebLab command sender targeting {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            reservation_id: reservation_id.into(),
            timeout_ms,
        })
    }

    fn build_call<'a>(&'a self, command: &'a str) -> SendCommandCall<'a> {
        SendCommandCall {
            method: "send_command",
            params: SendCommandParams {
                reservation_id: ReservationId {
                    id: &self.reservation_id,
                },
                command: CommandString {
                    commandstring: command,
                },
            },
        }
    }
}

/// Turn a JSON endpoint reply into the command's response string
fn interpret_reply(reply: JsonReply) -> TransportResult<String> {
    if reply.is_exception {
        let message = reply
            .message
            .unwrap_or_else(|| "Backend raised an exception".to_string());
        return Err(TransportError::CommandFailed(match reply.code {
            Some(code) => format!("{} ({})", message, code),
            None => message,
        }));
    }

    reply
        .result
        .and_then(|r| r.commandstring)
        .ok_or_else(|| TransportError::CommandFailed("Missing commandstring in reply".to_string()))
}

#[async_trait]
impl CommandSender for WebLabHttpSender {
    async fn send_command(&self, command: &str) -> TransportResult<String> {
        debug!("Sending command ({} bytes) to {}", command.len(), self.endpoint);

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(&self.build_call(command))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::CommandTimeout(self.timeout_ms)
                } else {
                    TransportError::from(e)
                }
            })?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let reply: JsonReply = response
                    .json()
                    .await
                    .map_err(|e| TransportError::CommandFailed(e.to_string()))?;
                interpret_reply(reply)
            }
            _ => {
                let error_text = response.text().await.unwrap_or_default();
                Err(TransportError::CommandFailed(format!(
                    "HTTP {}: {}",
                    status, error_text
                )))
            }
        }
    }

    fn sender_type(&self) -> &'static str {
        "weblab-json"
    }
}

impl std::fmt::Debug for WebLabHttpSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebLabHttpSender")
            .field("endpoint", &self.endpoint)
            .field("reservation_id", &self.reservation_id)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
