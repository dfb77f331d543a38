//! Strictly Chess - Unified CLI
//!
//! Plays a game in the terminal or runs the recommendation service.

#![warn(missing_docs)]

mod cli;
mod console;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use std::time::Duration;
use strictly_chess::{ArenaConfig, LICHESS_CLOUD_EVAL, LichessCloudEval};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play {
            config,
            engine_url,
            name,
            fen,
        } => run_play(config, engine_url, name, fen).await,
        Command::Serve {
            port,
            host,
            backend_timeout_secs,
        } => run_serve(host, port, backend_timeout_secs).await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_chess=debug")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run a game in the terminal
#[instrument(skip_all)]
async fn run_play(
    config_path: std::path::PathBuf,
    engine_url: Option<String>,
    name: Option<String>,
    fen: Option<String>,
) -> Result<()> {
    init_tracing();

    let mut config = ArenaConfig::load_or_default(&config_path)?
        .with_env_overrides()
        .with_engine_url_override(engine_url);
    if let Some(name) = name {
        config = config.with_player_name(name);
    }
    if fen.is_some() {
        config = config.with_start_fen(fen);
    }
    config.validate()?;

    info!(player = %config.player_name(), engine_url = %config.engine_url(), "Starting game");
    console::play(config).await
}

/// Run the recommendation service
#[instrument]
async fn run_serve(host: String, port: u16, backend_timeout_secs: u64) -> Result<()> {
    init_tracing();

    info!(port, "Recommendation service will listen on http://{}:{}", host, port);
    let backend = LichessCloudEval::new(
        LICHESS_CLOUD_EVAL,
        Duration::from_secs(backend_timeout_secs),
    )?;
    strictly_chess::serve(&host, port, Arc::new(backend)).await
}
