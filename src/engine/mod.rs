//! Remote move recommendation: wire types, errors and the HTTP client.

mod client;
mod error;
mod protocol;

pub use client::{HttpRecommendationClient, RecommendationService};
pub use error::{RemoteError, RemoteErrorKind};
pub use protocol::{
    AnalyzeRequest, BestMoveRequest, BestMoveResponse, HealthResponse, Recommendation,
    ValidateFenRequest, ValidateFenResponse,
};
