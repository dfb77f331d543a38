//! Evaluation backends behind the recommendation service.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Lichess cloud evaluation endpoint.
pub const LICHESS_CLOUD_EVAL: &str = "https://lichess.org/api/cloud-eval";

/// What a backend knows about a position.
#[derive(Debug, Clone, PartialEq, Default, Getters, derive_new::new)]
pub struct CloudEval {
    /// First move of the principal variation.
    best_move: Option<String>,
    /// Evaluation in centipawns.
    centipawns: Option<f64>,
    /// Mate distance.
    mate: Option<i32>,
}

/// Why a backend could not evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BackendErrorKind {
    /// The backend did not answer in time.
    Timeout,
    /// The backend answered with an error status.
    #[display("Status({})", _0)]
    Status(u16),
    /// Network failure.
    Network,
    /// The answer could not be decoded.
    Decode,
}

/// Backend error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Backend error ({}): {} at {}:{}", kind, message, file, line)]
pub struct BackendError {
    /// Error category.
    pub kind: BackendErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BackendError {
    /// Creates a new backend error.
    #[track_caller]
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Source of position evaluations.
#[async_trait::async_trait]
pub trait EvalBackend: std::fmt::Debug + Send + Sync {
    /// Evaluates `fen` to `depth`, considering `multi_pv` lines.
    async fn evaluate(
        &self,
        fen: &str,
        depth: u32,
        multi_pv: u32,
    ) -> Result<CloudEval, BackendError>;
}

/// Lichess cloud evaluation response.
#[derive(Debug, Deserialize)]
struct CloudEvalResponse {
    #[serde(default)]
    pvs: Vec<PrincipalVariation>,
}

#[derive(Debug, Deserialize)]
struct PrincipalVariation {
    #[serde(default)]
    moves: String,
    #[serde(default)]
    cp: Option<f64>,
    #[serde(default)]
    mate: Option<i32>,
}

/// Backend querying the Lichess cloud evaluation database.
#[derive(Debug, Clone)]
pub struct LichessCloudEval {
    endpoint: String,
    client: reqwest::Client,
}

impl LichessCloudEval {
    /// Creates a backend for `endpoint` with a per-request timeout.
    #[instrument(skip_all, fields(endpoint = %endpoint.as_ref()))]
    pub fn new(endpoint: impl AsRef<str>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::new(BackendErrorKind::Network, e.to_string()))?;
        info!("Lichess backend created");
        Ok(Self {
            endpoint: endpoint.as_ref().to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl EvalBackend for LichessCloudEval {
    #[instrument(skip(self))]
    async fn evaluate(
        &self,
        fen: &str,
        depth: u32,
        multi_pv: u32,
    ) -> Result<CloudEval, BackendError> {
        let url = reqwest::Url::parse_with_params(
            &self.endpoint,
            &[
                ("fen", fen.to_string()),
                ("depth", depth.to_string()),
                ("multiPv", multi_pv.to_string()),
            ],
        )
        .map_err(|e| BackendError::new(BackendErrorKind::Network, format!("Bad endpoint: {}", e)))?;

        debug!(url = %url, "Calling Lichess cloud eval");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                error!("Lichess API timeout");
                BackendError::new(BackendErrorKind::Timeout, "Lichess API timeout")
            } else {
                error!(error = %e, "Network error");
                BackendError::new(BackendErrorKind::Network, format!("Network error: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Lichess API error");
            return Err(BackendError::new(
                BackendErrorKind::Status(status.as_u16()),
                format!("Lichess API error: {}", status.as_u16()),
            ));
        }

        let body: CloudEvalResponse = response.json().await.map_err(|e| {
            BackendError::new(BackendErrorKind::Decode, format!("Malformed Lichess response: {}", e))
        })?;

        let Some(best) = body.pvs.into_iter().next() else {
            warn!("No principal variation in response");
            return Ok(CloudEval::default());
        };

        let best_move = best.moves.split_whitespace().next().map(str::to_string);
        info!(best_move = ?best_move, cp = ?best.cp, mate = ?best.mate, "Lichess evaluation received");
        Ok(CloudEval::new(best_move, best.cp, best.mate))
    }
}
