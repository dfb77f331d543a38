//! Arena configuration loaded from TOML.

use crate::games::chess::{RulesEngine, Side, StandardRules};
use crate::session::DEFAULT_SEARCH_DEPTH;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variable overriding [`ArenaConfig::engine_url`].
pub const ENGINE_URL_ENV: &str = "STRICTLY_CHESS_ENGINE_URL";

/// Configuration for a game against the recommendation service.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Name shown for the human player.
    #[serde(default = "default_player_name")]
    player_name: String,

    /// Base URL of the recommendation service.
    #[serde(default = "default_engine_url")]
    engine_url: String,

    /// Search depth sent with every best-move request.
    #[serde(default = "default_search_depth")]
    search_depth: u32,

    /// HTTP timeout for service calls, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,

    /// Pause before the remote move is requested, in milliseconds.
    #[serde(default = "default_remote_move_delay_ms")]
    remote_move_delay_ms: u64,

    /// How long the opponent considers a draw offer, in milliseconds.
    #[serde(default = "default_draw_decision_delay_ms")]
    draw_decision_delay_ms: u64,

    /// Optional starting position. White must be to move.
    #[serde(default)]
    start_fen: Option<String>,
}

fn default_player_name() -> String {
    "Player".to_string()
}

fn default_engine_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_search_depth() -> u32 {
    DEFAULT_SEARCH_DEPTH
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_remote_move_delay_ms() -> u64 {
    1000
}

fn default_draw_decision_delay_ms() -> u64 {
    2000
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            player_name: default_player_name(),
            engine_url: default_engine_url(),
            search_depth: default_search_depth(),
            request_timeout_secs: default_request_timeout_secs(),
            remote_move_delay_ms: default_remote_move_delay_ms(),
            draw_decision_delay_ms: default_draw_decision_delay_ms(),
            start_fen: None,
        }
    }
}

impl ArenaConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        info!(player = %config.player_name, engine_url = %config.engine_url, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            warn!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Applies an engine URL override, as read from [`ENGINE_URL_ENV`].
    pub fn with_engine_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            debug!(engine_url = %url, "Engine URL overridden");
            self.engine_url = url;
        }
        self
    }

    /// Applies the [`ENGINE_URL_ENV`] environment variable, if set.
    pub fn with_env_overrides(self) -> Self {
        let url = std::env::var(ENGINE_URL_ENV).ok();
        self.with_engine_url_override(url)
    }

    /// Replaces the player name.
    pub fn with_player_name(mut self, name: impl Into<String>) -> Self {
        self.player_name = name.into();
        self
    }

    /// Replaces the starting position.
    pub fn with_start_fen(mut self, fen: Option<String>) -> Self {
        self.start_fen = fen;
        self
    }

    /// HTTP timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Remote move delay as a [`Duration`].
    pub fn remote_move_delay(&self) -> Duration {
        Duration::from_millis(self.remote_move_delay_ms)
    }

    /// Draw decision delay as a [`Duration`].
    pub fn draw_decision_delay(&self) -> Duration {
        Duration::from_millis(self.draw_decision_delay_ms)
    }

    /// Checks values that serde cannot.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_depth == 0 {
            return Err(ConfigError::new("search_depth must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::new(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if let Some(fen) = &self.start_fen {
            let position = StandardRules
                .from_fen(fen)
                .map_err(|e| ConfigError::new(format!("Invalid start_fen: {}", e.message)))?;
            if StandardRules.side_to_move(&position) != Side::White {
                return Err(ConfigError::new(
                    "start_fen must have White to move".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
