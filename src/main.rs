use clap::Parser;
use tracing::{info, Level};

use uniquestream_source::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean JSON for the host
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting uniquestream v{}", env!("CARGO_PKG_VERSION"));

    cli.run().await?;

    Ok(())
}
