//! Tests for the HTTP recommendation client against a live loopback server.

use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;
use strictly_chess::{
    BackendError, BackendErrorKind, ChessMove, CloudEval, DrawDecision, EvalBackend,
    FixedPolicy, GameCoordinator, HttpRecommendationClient, Phase, RecommendationService,
    RemoteErrorKind, StandardRules, router,
};

#[derive(Debug, Clone)]
struct StubBackend {
    reply: Result<CloudEval, BackendError>,
}

impl StubBackend {
    fn answering(best_move: &str, centipawns: f64) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(CloudEval::new(
                Some(best_move.to_string()),
                Some(centipawns),
                None,
            )),
        })
    }

    fn failing(kind: BackendErrorKind) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(BackendError::new(kind, "stub failure")),
        })
    }
}

#[async_trait::async_trait]
impl EvalBackend for StubBackend {
    async fn evaluate(
        &self,
        _fen: &str,
        _depth: u32,
        _multi_pv: u32,
    ) -> Result<CloudEval, BackendError> {
        self.reply.clone()
    }
}

/// Serves `app` on an ephemeral loopback port and returns its base URL.
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> HttpRecommendationClient {
    HttpRecommendationClient::new(base_url, Some(Duration::from_secs(5))).unwrap()
}

const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

#[tokio::test]
async fn test_best_move_round_trip() {
    let base = spawn(router(StubBackend::answering("e7e5", -20.0))).await;

    let recommendation = client(&base).best_move(AFTER_E4, 12).await.unwrap();

    assert_eq!(recommendation.best_move(), "e7e5");
    assert_eq!(*recommendation.evaluation(), Some(-20.0));
    assert_eq!(*recommendation.mate(), None);
    assert_eq!(recommendation.fen(), AFTER_E4);
}

#[tokio::test]
async fn test_health_check() {
    let base = spawn(router(StubBackend::answering("e7e5", 0.0))).await;

    assert!(client(&base).health().await.is_ok());
}

#[tokio::test]
async fn test_backend_timeout_is_unavailable() {
    let base = spawn(router(StubBackend::failing(BackendErrorKind::Timeout))).await;

    let error = client(&base).best_move(AFTER_E4, 12).await.unwrap_err();

    assert_eq!(error.kind, RemoteErrorKind::Unavailable);
    assert!(error.message.contains("stub failure"), "{}", error.message);
}

#[tokio::test]
async fn test_unreachable_service_is_unavailable() {
    // Bind and drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let error = client(&format!("http://{}", addr))
        .best_move(AFTER_E4, 12)
        .await
        .unwrap_err();

    assert_eq!(error.kind, RemoteErrorKind::Unavailable);
}

#[tokio::test]
async fn test_unsuccessful_reply_is_rejected() {
    let app = Router::new().route(
        "/api/best-move",
        post(|| async { Json(serde_json::json!({ "success": false, "error": "timeout" })) }),
    );
    let base = spawn(app).await;

    let error = client(&base).best_move(AFTER_E4, 12).await.unwrap_err();

    assert_eq!(error.kind, RemoteErrorKind::Rejected);
    assert_eq!(error.message, "timeout");
}

#[tokio::test]
async fn test_reply_without_move_is_no_move() {
    let app = Router::new().route(
        "/api/best-move",
        post(|| async {
            Json(serde_json::json!({ "success": true, "fen": AFTER_E4, "bestMove": null }))
        }),
    );
    let base = spawn(app).await;

    let error = client(&base).best_move(AFTER_E4, 12).await.unwrap_err();

    assert_eq!(error.kind, RemoteErrorKind::NoMove);
}

#[tokio::test]
async fn test_validate_fen() {
    let base = spawn(router(StubBackend::answering("e7e5", 0.0))).await;
    let client = client(&base);

    assert!(client.validate_fen(AFTER_E4).await.unwrap());
    assert!(!client.validate_fen("not a position").await.unwrap());
}

#[tokio::test]
async fn test_analyze_without_move_succeeds() {
    let base = spawn(router(Arc::new(StubBackend {
        reply: Ok(CloudEval::default()),
    })))
    .await;

    let analysis = client(&base).analyze(AFTER_E4, 12, 1).await.unwrap();

    assert!(analysis.success);
    assert_eq!(analysis.best_move, None);
}

#[tokio::test]
async fn test_coordinator_plays_against_http_service() {
    let base = spawn(router(StubBackend::answering("c7c5", 30.0))).await;
    let mut game = GameCoordinator::new(
        StandardRules,
        Arc::new(client(&base)),
        Arc::new(FixedPolicy(DrawDecision::Decline)),
    );

    game.apply_move("e2e4".parse::<ChessMove>().unwrap()).unwrap();
    let applied = game.request_remote_move().await.unwrap();

    assert_eq!(applied.san(), "c5");
    assert_eq!(game.phase(), Phase::AwaitingHumanMove);
    assert_eq!(game.records()[0].remote().as_deref(), Some("c5"));
}

#[test]
fn test_base_url_drops_trailing_slash() {
    let client = client("http://localhost:5000/");

    assert_eq!(client.base_url(), "http://localhost:5000");
}
