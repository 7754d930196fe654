use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::gio::{BridgeState, run_bridge};
use crate::handlers::Dispatcher;
use crate::inference::create_inference;
use crate::rollup::{LoopSettings, NoticeEmitter, RollupHttpClient, RollupRunner};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::status::render_status;

/// Token cancelled on Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => tracing::warn!("Failed to listen for Ctrl-C: {e}"),
        }
        trigger.cancel();
    });
    cancel
}

/// Start the inference backend and run the rollup loop until shutdown.
///
/// Backend initialization failure is the only error that ends the process.
async fn run_rollup(config: &Config) -> Result<()> {
    info!("HTTP rollup_server url is {}", config.rollup.server_url);

    let inference =
        create_inference(&config.inference).context("initialize inference backend")?;
    let client = Arc::new(RollupHttpClient::new(
        &config.rollup.server_url,
        config.rollup.request_timeout_secs,
    ));
    let dispatcher = Dispatcher::new(
        Arc::clone(&inference),
        Arc::clone(&client) as Arc<dyn NoticeEmitter>,
    );
    let runner = RollupRunner::new(
        client,
        dispatcher,
        inference,
        LoopSettings::from(&config.rollup),
    );

    runner
        .run(shutdown_token())
        .await
        .context("inference backend failed to initialize")?;
    Ok(())
}

async fn serve_gio(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.gio.host.clone());
    let port = port.unwrap_or(config.gio.port);
    if port == 0 {
        info!("Starting GIO bridge on {host} (random port)");
    } else {
        info!("Starting GIO bridge on {host}:{port}");
    }

    let state = BridgeState::new(
        &config.rollup.server_url,
        config.gio.domain,
        config.inference.timeout_secs,
    );
    run_bridge(&host, port, state, shutdown_token()).await
}

pub async fn dispatch(cli: Cli, config: Arc<Config>) -> Result<()> {
    match cli.command {
        Commands::Run => run_rollup(&config).await,
        Commands::ServeGio { port, host } => serve_gio(&config, host, port).await,
        Commands::Status => {
            println!("{}", render_status(&config));
            Ok(())
        }
    }
}
