//! Blastradius CLI binary.

use anyhow::Result;
use blastradius::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the blastradius CLI.
///
/// Uses tokio's `current_thread` runtime; every command is a short sequence
/// of I/O-bound steps.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output on stdout stays parseable.
    // Example: RUST_LOG=blastradius=debug,blastradius_sheets=debug blastradius import estate.xlsx
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("blastradius=info,blastradius_sheets=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting blastradius CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Blastradius CLI completed successfully");
    Ok(())
}
