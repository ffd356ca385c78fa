//! CLI Commands
//!
//! Argument parsing and settings resolution for the `wltransport` binary.

pub mod exchange;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::TransportSettings;

#[derive(Debug, Parser)]
#[command(name = "wltransport", version, about = "Talk to a remote laboratory backend")]
pub struct Cli {
    /// TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON endpoint of the backend (overrides the settings file)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Reservation id (overrides the settings file)
    #[arg(long)]
    pub reservation: Option<String>,

    /// Per-command timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Log in and print the session key
    Login,
    /// Log in, send one request fragment and print the response payload
    Request {
        /// Inner XML of the request
        xml: String,
    },
}

impl Cli {
    /// Merge the settings file with command-line overrides
    pub fn settings(&self) -> anyhow::Result<TransportSettings> {
        let mut settings = match &self.config {
            Some(path) => TransportSettings::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => {
                let (Some(endpoint), Some(reservation)) = (&self.endpoint, &self.reservation)
                else {
                    bail!("either --config or both --endpoint and --reservation are required");
                };
                TransportSettings::new(endpoint.clone(), reservation.clone())
            }
        };

        if let Some(ref endpoint) = self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(ref reservation) = self.reservation {
            settings.reservation_id = reservation.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.timeout_ms = timeout_ms;
        }

        settings.validate()?;
        Ok(settings)
    }
}
