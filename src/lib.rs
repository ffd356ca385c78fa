// Session transport for remote laboratory backends.

// Declare modules
pub mod commands;
pub mod config;
pub mod transport;

pub use config::TransportSettings;
pub use transport::{
    CommandSender, PendingRequest, Rejected, SessionTransport, TransportError, TransportEvent,
    TransportResult, WorkingState,
};

use commands::Cli;

/// Run the CLI: resolve settings, talk to the backend, print the result.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.settings()?;
    let transport = commands::exchange::build_transport(&settings)?;
    let output = commands::exchange::execute(&transport, &cli.command).await?;
    println!("{}", output);
    Ok(())
}
