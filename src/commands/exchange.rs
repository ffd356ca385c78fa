//! Login and request handlers used by the binary.

use anyhow::Context;
use log::{debug, info};
use std::sync::Arc;

use super::Command;
use crate::config::TransportSettings;
use crate::transport::{CommandSender, SessionTransport, WebLabHttpSender};

/// Build a transport over the HTTP sender described by `settings`
pub fn build_transport(settings: &TransportSettings) -> anyhow::Result<SessionTransport> {
    let sender = WebLabHttpSender::new(
        settings.endpoint.clone(),
        settings.reservation_id.clone(),
        settings.timeout_ms,
    )
    .context("creating command sender")?;
    Ok(transport_over(Arc::new(sender), settings))
}

pub(crate) fn transport_over(
    sender: Arc<dyn CommandSender>,
    settings: &TransportSettings,
) -> SessionTransport {
    SessionTransport::builder(sender)
        .login_command(settings.login_command.clone())
        .working_callback(|is_working, should_continue| {
            debug!("working={} continue={}", is_working, should_continue);
        })
        .build()
}

/// Run one CLI command and return what should be printed
pub async fn execute(transport: &SessionTransport, command: &Command) -> anyhow::Result<String> {
    transport.connect().await.context("login failed")?;
    let session_key = transport
        .session()
        .map(|s| s.key)
        .context("login returned no session")?;
    info!("Logged in");

    match command {
        Command::Login => Ok(session_key),
        Command::Request { xml } => {
            let pending = transport.request(xml.clone())?;
            debug!("Request {} dispatched", pending.request_id());
            let payload = pending.await.context("request failed")?;
            Ok(payload)
        }
    }
}
