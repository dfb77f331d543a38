//! Draw offer decisions.
//!
//! The remote side's answer to a draw offer is a policy, kept apart from
//! the turn protocol so it can be swapped for something deterministic.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Answer to a draw offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum DrawDecision {
    /// The game ends drawn.
    Accept,
    /// Play continues.
    Decline,
}

/// Decides draw offers on behalf of the remote side.
#[async_trait::async_trait]
pub trait DrawPolicy: std::fmt::Debug + Send + Sync {
    /// Decides whether to accept a draw in the position `fen`.
    async fn decide(&self, fen: &str) -> DrawDecision;
}

/// Accepts with a fixed probability after a pause.
#[derive(Debug, Clone)]
pub struct CoinFlipPolicy {
    delay: Duration,
    acceptance: f64,
}

impl CoinFlipPolicy {
    /// Creates a policy accepting with probability `acceptance` after `delay`.
    pub fn new(delay: Duration, acceptance: f64) -> Self {
        Self {
            delay,
            acceptance: acceptance.clamp(0.0, 1.0),
        }
    }
}

impl Default for CoinFlipPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), 0.5)
    }
}

#[async_trait::async_trait]
impl DrawPolicy for CoinFlipPolicy {
    #[instrument(skip(self))]
    async fn decide(&self, fen: &str) -> DrawDecision {
        tokio::time::sleep(self.delay).await;
        let accept = rand::thread_rng().gen_bool(self.acceptance);
        debug!(accept, "Draw offer decided");
        if accept {
            DrawDecision::Accept
        } else {
            DrawDecision::Decline
        }
    }
}

/// Always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedPolicy(pub DrawDecision);

#[async_trait::async_trait]
impl DrawPolicy for FixedPolicy {
    async fn decide(&self, _fen: &str) -> DrawDecision {
        self.0
    }
}
