#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use rollup_llm::Cli;
use rollup_llm::app::startup;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Install default crypto provider for Rustls TLS.
    // This prevents the error: "could not automatically determine the process-level CryptoProvider"
    // when both aws-lc-rs and ring features are available (or neither is explicitly selected).
    if let Err(e) = rustls::crypto::ring::default_provider().install_default() {
        eprintln!("Warning: Failed to install default crypto provider: {e:?}");
    }

    let cli = Cli::parse();
    let config = startup::load_config(cli.config.as_deref(), std::io::stderr)?;
    startup::init_logging(&config.log_level)?;

    rollup_llm::app::dispatch(cli, Arc::new(config)).await
}
