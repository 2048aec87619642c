//! CLI entry point for segment placement tooling.

use clap::Parser;
use cli::{telemetry, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();
    telemetry::init(&cli.log_level);

    let output = cli.run().await?;
    println!("{output}");
    Ok(())
}
