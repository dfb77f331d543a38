//! Shared test doubles.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use strictly_chess::{
    DrawDecision, FixedPolicy, GameCoordinator, Recommendation, RecommendationService,
    RemoteError, StandardRules,
};

/// Recommendation service answering from a script, in order.
///
/// When the script runs out every call fails as unavailable.
#[derive(Debug, Default)]
pub struct ScriptedService {
    replies: Mutex<VecDeque<Result<Recommendation, RemoteError>>>,
    calls: AtomicUsize,
    fens: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queues moves, each answered with evaluation 0.
    pub fn with_moves(moves: &[&str]) -> Arc<Self> {
        let service = Self::new();
        for mv in moves {
            service.push_move(mv);
        }
        service
    }

    pub fn push_move(&self, mv: &str) {
        self.push(Ok(Recommendation::new(String::new(), mv.to_string(), Some(0.0), None)));
    }

    pub fn push(&self, reply: Result<Recommendation, RemoteError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fens(&self) -> Vec<String> {
        self.fens.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RecommendationService for ScriptedService {
    async fn best_move(&self, fen: &str, _depth: u32) -> Result<Recommendation, RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.fens.lock().unwrap().push(fen.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(RemoteError::unavailable("script exhausted")))
    }

    async fn validate_fen(&self, _fen: &str) -> Result<bool, RemoteError> {
        Ok(true)
    }
}

/// Coordinator over `service` whose draw offers get `decision`.
pub fn coordinator(service: Arc<ScriptedService>, decision: DrawDecision) -> GameCoordinator {
    GameCoordinator::new(StandardRules, service, Arc::new(FixedPolicy(decision)))
}

pub fn mv(text: &str) -> strictly_chess::ChessMove {
    text.parse().unwrap()
}
