//! Recommendation service seam and its HTTP client.

use super::protocol::{
    AnalyzeRequest, BestMoveRequest, BestMoveResponse, HealthResponse, Recommendation,
    ValidateFenRequest, ValidateFenResponse,
};
use super::RemoteError;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Something that can suggest a move for a position.
#[async_trait::async_trait]
pub trait RecommendationService: std::fmt::Debug + Send + Sync {
    /// Asks for the best move in `fen`, searching to `depth`.
    async fn best_move(&self, fen: &str, depth: u32) -> Result<Recommendation, RemoteError>;

    /// Asks whether `fen` is a usable position.
    async fn validate_fen(&self, fen: &str) -> Result<bool, RemoteError>;
}

/// JSON-over-HTTP client for the recommendation service.
#[derive(Debug, Clone)]
pub struct HttpRecommendationClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRecommendationClient {
    /// Creates a client for the service at `base_url`.
    #[instrument(skip_all, fields(base_url = %base_url.as_ref()))]
    pub fn new(base_url: impl AsRef<str>, timeout: Option<Duration>) -> Result<Self, RemoteError> {
        let mut builder = reqwest::Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RemoteError::unavailable(format!("Failed to build HTTP client: {}", e)))?;

        info!("Recommendation client created");
        Ok(Self {
            base_url: base_url.as_ref().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Base URL of the service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Checks that the service is up.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<(), RemoteError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RemoteError::unavailable(format!("Health check failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(RemoteError::unavailable(format!(
                "Health check returned {}",
                response.status()
            )));
        }

        let body: HealthResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::unavailable(format!("Malformed health response: {}", e)))?;
        debug!(status = %body.status, "Health check answered");
        Ok(())
    }

    /// Requests a full analysis. Unlike [`RecommendationService::best_move`],
    /// an answer without a move is not an error.
    #[instrument(skip(self))]
    pub async fn analyze(
        &self,
        fen: &str,
        depth: u32,
        multi_pv: u32,
    ) -> Result<BestMoveResponse, RemoteError> {
        let request = AnalyzeRequest {
            fen: Some(fen.to_string()),
            depth,
            multi_pv,
        };
        let response: BestMoveResponse = self.post("/api/analyze", &request).await?;
        if !response.success {
            return Err(RemoteError::rejected(
                response
                    .error
                    .unwrap_or_else(|| "Failed to analyze position".to_string()),
            ));
        }
        Ok(response)
    }

    /// Posts a JSON body and decodes the JSON reply.
    ///
    /// A non-success status is reported as unavailable, using the body's
    /// `error` field when the service sent one.
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, RemoteError>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Sending request");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, url = %url, "Request failed");
                RemoteError::unavailable(format!("Request to {} failed: {}", url, e))
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RemoteError::unavailable(format!("Failed to read response: {}", e)))?;
        debug!(status = %status, body = %text, "Got response");

        if !status.is_success() {
            let detail = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|json| json.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(text);
            return Err(RemoteError::unavailable(format!("API error {}: {}", status, detail)));
        }

        serde_json::from_str(&text)
            .map_err(|e| RemoteError::unavailable(format!("Malformed response: {}", e)))
    }
}

#[async_trait::async_trait]
impl RecommendationService for HttpRecommendationClient {
    #[instrument(skip(self))]
    async fn best_move(&self, fen: &str, depth: u32) -> Result<Recommendation, RemoteError> {
        info!("Requesting best move");
        let request = BestMoveRequest {
            fen: Some(fen.to_string()),
            depth,
        };
        let response: BestMoveResponse = self.post("/api/best-move", &request).await?;

        if !response.success {
            return Err(RemoteError::rejected(
                response
                    .error
                    .unwrap_or_else(|| "Failed to get best move".to_string()),
            ));
        }

        let best_move = response
            .best_move
            .filter(|mv| !mv.trim().is_empty())
            .ok_or_else(|| RemoteError::no_move("Service returned no move"))?;

        info!(best_move = %best_move, evaluation = ?response.evaluation, "Best move received");
        Ok(Recommendation::new(
            response.fen.unwrap_or_else(|| fen.to_string()),
            best_move,
            response.evaluation,
            response.mate,
        ))
    }

    #[instrument(skip(self))]
    async fn validate_fen(&self, fen: &str) -> Result<bool, RemoteError> {
        let request = ValidateFenRequest {
            fen: Some(fen.to_string()),
        };
        let response: ValidateFenResponse = self.post("/api/validate-fen", &request).await?;
        debug!(valid = response.valid, "FEN validation answered");
        Ok(response.success && response.valid)
    }
}
