//! JSON bodies exchanged with the recommendation service.

use crate::session::DEFAULT_SEARCH_DEPTH;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/best-move`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestMoveRequest {
    /// Position to search, as FEN. Optional on the wire so the service can
    /// answer a missing position with a proper error.
    #[serde(default)]
    pub fen: Option<String>,
    /// Requested search depth.
    #[serde(default = "default_depth")]
    pub depth: u32,
}

/// Body of `POST /api/analyze`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Position to analyse, as FEN.
    #[serde(default)]
    pub fen: Option<String>,
    /// Requested search depth.
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Number of principal variations.
    #[serde(default = "default_multi_pv")]
    pub multi_pv: u32,
}

/// Reply to best-move and analyze requests.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestMoveResponse {
    /// Whether the service produced an answer.
    pub success: bool,
    /// Position that was searched.
    #[serde(default)]
    pub fen: Option<String>,
    /// Recommended move in coordinate notation (`e2e4`).
    #[serde(default)]
    pub best_move: Option<String>,
    /// Evaluation in centipawns from White's point of view.
    #[serde(default)]
    pub evaluation: Option<f64>,
    /// Moves to mate, if the evaluation is a forced mate.
    #[serde(default)]
    pub mate: Option<i32>,
    /// Failure description when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BestMoveResponse {
    /// Builds a failure reply.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Body of `POST /api/validate-fen`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidateFenRequest {
    /// Position to check.
    #[serde(default)]
    pub fen: Option<String>,
}

/// Reply to `POST /api/validate-fen`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidateFenResponse {
    /// Whether the request was processed.
    pub success: bool,
    /// Whether the position is usable.
    #[serde(default)]
    pub valid: bool,
    /// Position that was checked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fen: Option<String>,
    /// Failure description when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reply to `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the service is up.
    pub status: String,
}

/// A successful recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters, derive_new::new)]
pub struct Recommendation {
    /// Position that was searched.
    fen: String,
    /// Recommended move in coordinate notation.
    best_move: String,
    /// Evaluation in centipawns, if reported.
    evaluation: Option<f64>,
    /// Mate distance, if reported.
    mate: Option<i32>,
}

fn default_depth() -> u32 {
    DEFAULT_SEARCH_DEPTH
}

fn default_multi_pv() -> u32 {
    1
}
