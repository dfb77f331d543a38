//! Tests for the Lichess cloud evaluation backend against a local stand-in.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use strictly_chess::{BackendErrorKind, CloudEval, EvalBackend, LichessCloudEval};

const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";

type Queries = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Serves `reply` at `/api/cloud-eval`, recording each query string.
async fn spawn(status: StatusCode, reply: Value) -> (String, Queries) {
    let queries: Queries = Arc::default();
    let app = Router::new()
        .route(
            "/api/cloud-eval",
            get(
                move |State(queries): State<Queries>, Query(params): Query<HashMap<String, String>>| {
                    let reply = reply.clone();
                    async move {
                        queries.lock().unwrap().push(params);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(queries.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/api/cloud-eval", addr), queries)
}

fn backend(endpoint: &str) -> LichessCloudEval {
    LichessCloudEval::new(endpoint, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_forwards_depth_and_lines() {
    let (endpoint, queries) = spawn(
        StatusCode::OK,
        json!({ "fen": AFTER_E4, "pvs": [{ "moves": "c7c5 g1f3 d7d6", "cp": -18 }] }),
    )
    .await;

    let eval = backend(&endpoint).evaluate(AFTER_E4, 12, 2).await.unwrap();

    assert_eq!(eval, CloudEval::new(Some("c7c5".to_string()), Some(-18.0), None));
    let queries = queries.lock().unwrap().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].get("fen").map(String::as_str), Some(AFTER_E4));
    assert_eq!(queries[0].get("depth").map(String::as_str), Some("12"));
    assert_eq!(queries[0].get("multiPv").map(String::as_str), Some("2"));
}

#[tokio::test]
async fn test_reads_mate_scores() {
    let (endpoint, _) = spawn(
        StatusCode::OK,
        json!({ "pvs": [{ "moves": "d8h4", "mate": -1 }] }),
    )
    .await;

    let eval = backend(&endpoint).evaluate(AFTER_E4, 20, 1).await.unwrap();

    assert_eq!(eval.best_move().as_deref(), Some("d8h4"));
    assert_eq!(*eval.mate(), Some(-1));
    assert_eq!(*eval.centipawns(), None);
}

#[tokio::test]
async fn test_unknown_position_is_status_error() {
    let (endpoint, _) = spawn(StatusCode::NOT_FOUND, json!({ "error": "Not found" })).await;

    let error = backend(&endpoint).evaluate(AFTER_E4, 20, 1).await.unwrap_err();

    assert_eq!(error.kind, BackendErrorKind::Status(404));
}

#[tokio::test]
async fn test_no_variations_means_no_move() {
    let (endpoint, _) = spawn(StatusCode::OK, json!({ "pvs": [] })).await;

    let eval = backend(&endpoint).evaluate(AFTER_E4, 20, 1).await.unwrap();

    assert_eq!(eval, CloudEval::default());
}
