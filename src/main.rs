use clap::Parser;

/// Command-line entry point
///
/// This is a thin wrapper that delegates to the library crate.
/// All transport code lives in lib.rs and its modules.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = wltransport_lib::commands::Cli::parse();
    wltransport_lib::run(cli).await
}
