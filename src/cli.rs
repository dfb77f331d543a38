//! Command-line interface for strictly_chess.

use clap::{Parser, Subcommand};

/// Strictly Chess - play against a remote move-recommendation service
#[derive(Parser, Debug)]
#[command(name = "strictly_chess")]
#[command(about = "Chess against a remote engine, with a type-safe session core", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game in the terminal
    Play {
        /// Path to arena config
        #[arg(short, long, default_value = "arena_config.toml")]
        config: std::path::PathBuf,

        /// Recommendation service URL (overrides config and environment)
        #[arg(long)]
        engine_url: Option<String>,

        /// Player name
        #[arg(short, long)]
        name: Option<String>,

        /// Starting position as FEN (White to move)
        #[arg(long)]
        fen: Option<String>,
    },

    /// Run the recommendation service
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Request timeout for the evaluation backend, in seconds
        #[arg(long, default_value = "10")]
        backend_timeout_secs: u64,
    },
}
