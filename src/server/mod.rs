//! HTTP recommendation service.
//!
//! Serves best-move, analysis and FEN validation endpoints on top of an
//! [`EvalBackend`].

mod backend;

pub use backend::{
    BackendError, BackendErrorKind, CloudEval, EvalBackend, LICHESS_CLOUD_EVAL, LichessCloudEval,
};

use crate::engine::{
    AnalyzeRequest, BestMoveRequest, BestMoveResponse, HealthResponse, ValidateFenRequest,
    ValidateFenResponse,
};
use crate::games::chess::{RulesEngine, StandardRules};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Depth used when validating a position with the backend.
const VALIDATION_DEPTH: u32 = 1;

/// Principal variations requested for a best move.
const SINGLE_LINE: u32 = 1;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    backend: Arc<dyn EvalBackend>,
}

/// Builds the service router.
pub fn router(backend: Arc<dyn EvalBackend>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/best-move", post(best_move))
        .route("/api/analyze", post(analyze))
        .route("/api/validate-fen", post(validate_fen))
        .with_state(AppState { backend })
}

/// Binds `host:port` and serves until the process stops.
#[instrument(skip(backend))]
pub async fn serve(host: &str, port: u16, backend: Arc<dyn EvalBackend>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!(address = %listener.local_addr()?, "Recommendation service listening");
    axum::serve(listener, router(backend)).await?;
    Ok(())
}

#[instrument]
async fn health() -> Json<HealthResponse> {
    info!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[instrument(skip_all)]
async fn best_move(
    State(state): State<AppState>,
    Json(request): Json<BestMoveRequest>,
) -> (StatusCode, Json<BestMoveResponse>) {
    let Some(fen) = request.fen.filter(|fen| !fen.trim().is_empty()) else {
        warn!("FEN position is required but not provided");
        return (
            StatusCode::BAD_REQUEST,
            Json(BestMoveResponse::failure("FEN position is required")),
        );
    };
    info!(fen = %fen, "Best move request received");

    match state.backend.evaluate(&fen, request.depth, SINGLE_LINE).await {
        Ok(eval) => match eval.best_move() {
            Some(best_move) => {
                info!(best_move = %best_move, "Returning best move");
                (
                    StatusCode::OK,
                    Json(BestMoveResponse {
                        success: true,
                        best_move: Some(best_move.clone()),
                        evaluation: *eval.centipawns(),
                        mate: *eval.mate(),
                        fen: Some(fen),
                        error: None,
                    }),
                )
            }
            None => {
                warn!("No move returned from backend");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(BestMoveResponse::failure("No move returned from backend")),
                )
            }
        },
        Err(e) => backend_failure(e),
    }
}

#[instrument(skip_all)]
async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> (StatusCode, Json<BestMoveResponse>) {
    let Some(fen) = request.fen.filter(|fen| !fen.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(BestMoveResponse::failure("FEN position is required")),
        );
    };

    match state
        .backend
        .evaluate(&fen, request.depth, request.multi_pv)
        .await
    {
        Ok(eval) => {
            info!(best_move = ?eval.best_move(), "Analysis complete");
            (
                StatusCode::OK,
                Json(BestMoveResponse {
                    success: true,
                    best_move: eval.best_move().clone(),
                    evaluation: *eval.centipawns(),
                    mate: *eval.mate(),
                    fen: Some(fen),
                    error: None,
                }),
            )
        }
        Err(e) => backend_failure(e),
    }
}

/// A position is valid when it parses as a legal position and the backend
/// does not reject it outright. Backend outages and unknown positions do
/// not make a position invalid: a 404 from the cloud database only means
/// nobody has analysed the position yet.
#[instrument(skip_all)]
async fn validate_fen(
    State(state): State<AppState>,
    Json(request): Json<ValidateFenRequest>,
) -> (StatusCode, Json<ValidateFenResponse>) {
    let Some(fen) = request.fen.filter(|fen| !fen.trim().is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ValidateFenResponse {
                success: false,
                error: Some("FEN position is required".to_string()),
                ..ValidateFenResponse::default()
            }),
        );
    };

    let valid = match StandardRules.from_fen(&fen) {
        Err(e) => {
            info!(error = %e, "FEN rejected locally");
            false
        }
        Ok(_) => match state.backend.evaluate(&fen, VALIDATION_DEPTH, SINGLE_LINE).await {
            Err(e) if e.kind == BackendErrorKind::Status(400) => false,
            Err(e) => {
                warn!(error = %e, "Backend unavailable during validation");
                true
            }
            Ok(_) => true,
        },
    };

    info!(valid, "FEN validation result");
    (
        StatusCode::OK,
        Json(ValidateFenResponse {
            success: true,
            valid,
            fen: Some(fen),
            error: None,
        }),
    )
}

fn backend_failure(e: BackendError) -> (StatusCode, Json<BestMoveResponse>) {
    let status = match e.kind {
        BackendErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(status = %status, error = %e.message, "Backend failed");
    (status, Json(BestMoveResponse::failure(e.message)))
}
