//! Strictly Chess library - a human plays chess against a remote
//! move-recommendation service.
//!
//! # Architecture
//!
//! - **Games**: chess rules behind the [`RulesEngine`] seam, backed by `shakmaty`
//! - **Engine**: the [`RecommendationService`] seam and its HTTP client
//! - **Session**: the turn-taking [`GameCoordinator`] and its [`SessionDriver`] task
//! - **Server**: the HTTP recommendation service in front of an [`EvalBackend`]
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_chess::{
//!     ChessMove, FixedPolicy, DrawDecision, GameCoordinator, HttpRecommendationClient,
//!     StandardRules,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let service = HttpRecommendationClient::new("http://localhost:5000", None)?;
//! let mut game = GameCoordinator::new(
//!     StandardRules,
//!     Arc::new(service),
//!     Arc::new(FixedPolicy(DrawDecision::Decline)),
//! );
//!
//! game.apply_move("e2e4".parse::<ChessMove>()?)?;
//! let reply = game.request_remote_move().await?;
//! println!("Engine played {}", reply.san());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod engine;
mod games;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ArenaConfig, ConfigError, ENGINE_URL_ENV};

// Crate-level exports - Chess rules
pub use games::chess::{
    ChessMove, DrawRule, GameEnd, MoveParseError, Ply, Position, Promotion, RulesEngine,
    RulesError, Side, Square, StandardRules,
};

// Crate-level exports - Recommendation service client
pub use engine::{
    AnalyzeRequest, BestMoveRequest, BestMoveResponse, HealthResponse, HttpRecommendationClient,
    Recommendation, RecommendationService, RemoteError, RemoteErrorKind, ValidateFenRequest,
    ValidateFenResponse,
};

// Crate-level exports - Session coordination
pub use session::{
    AppliedMove, CoinFlipPolicy, DEFAULT_SEARCH_DEPTH, DrawDecision, DrawOffer, DrawOutcome,
    DrawPolicy, DrawReply, DriverClosed, FixedPolicy, GameCoordinator, MoveLog, MoveRecord, Phase,
    RemoteMoveReply, RemoteMoveRequest, Seat, SessionCommand, SessionDriver, SessionError,
    SessionEvent, SessionHandle, SessionSnapshot, Termination, Ticket,
};

// Crate-level exports - Recommendation service server
pub use server::{
    AppState, BackendError, BackendErrorKind, CloudEval, EvalBackend, LICHESS_CLOUD_EVAL,
    LichessCloudEval, router, serve,
};
