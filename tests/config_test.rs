//! Tests for arena configuration loading.

use std::io::Write;
use std::time::Duration;
use strictly_chess::{ArenaConfig, BestMoveRequest, DEFAULT_SEARCH_DEPTH};
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write config");
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(
        r#"
player_name = "Alice"
engine_url = "http://engine.local:5000"
search_depth = 12
request_timeout_secs = 5
remote_move_delay_ms = 250
draw_decision_delay_ms = 0
start_fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"
"#,
    );

    let config = ArenaConfig::from_file(file.path()).expect("Load failed");

    assert_eq!(config.player_name(), "Alice");
    assert_eq!(config.engine_url(), "http://engine.local:5000");
    assert_eq!(*config.search_depth(), 12);
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.remote_move_delay(), Duration::from_millis(250));
    assert_eq!(config.draw_decision_delay(), Duration::ZERO);
    assert_eq!(
        config.start_fen().as_deref(),
        Some("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1")
    );
}

#[test]
fn test_missing_fields_use_defaults() {
    let file = write_config("player_name = \"Bob\"\n");

    let config = ArenaConfig::from_file(file.path()).expect("Load failed");

    assert_eq!(config.player_name(), "Bob");
    assert_eq!(config.engine_url(), "http://localhost:5000");
    assert_eq!(*config.search_depth(), 20);
    assert_eq!(config.request_timeout(), Duration::from_secs(30));
    assert_eq!(config.remote_move_delay(), Duration::from_millis(1000));
    assert_eq!(config.draw_decision_delay(), Duration::from_millis(2000));
    assert!(config.start_fen().is_none());
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("absent.toml");

    assert!(ArenaConfig::from_file(&path).is_err());
    let config = ArenaConfig::load_or_default(&path).expect("Defaults expected");
    assert_eq!(config, ArenaConfig::default());
}

#[test]
fn test_malformed_toml_is_rejected() {
    let file = write_config("search_depth = \"deep\"\n");

    let error = ArenaConfig::from_file(file.path()).unwrap_err();

    assert!(error.message.contains("Failed to parse config"), "{}", error.message);
}

#[test]
fn test_start_fen_must_have_white_to_move() {
    let file = write_config(
        "start_fen = \"rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1\"\n",
    );

    let error = ArenaConfig::from_file(file.path()).unwrap_err();

    assert!(error.message.contains("White to move"), "{}", error.message);
}

#[test]
fn test_start_fen_must_parse() {
    let file = write_config("start_fen = \"nonsense\"\n");

    assert!(ArenaConfig::from_file(file.path()).is_err());
}

#[test]
fn test_zero_depth_is_rejected() {
    let file = write_config("search_depth = 0\n");

    assert!(ArenaConfig::from_file(file.path()).is_err());
}

#[test]
fn test_engine_url_override() {
    let config = ArenaConfig::default();

    let unchanged = config.clone().with_engine_url_override(None);
    assert_eq!(unchanged.engine_url(), "http://localhost:5000");

    let blank = config.clone().with_engine_url_override(Some("  ".to_string()));
    assert_eq!(blank.engine_url(), "http://localhost:5000");

    let overridden = config.with_engine_url_override(Some("http://10.0.0.2:5000".to_string()));
    assert_eq!(overridden.engine_url(), "http://10.0.0.2:5000");
}

#[test]
fn test_default_depth_is_shared() {
    let request: BestMoveRequest = serde_json::from_str(r#"{ "fen": "x" }"#).unwrap();

    assert_eq!(*ArenaConfig::default().search_depth(), DEFAULT_SEARCH_DEPTH);
    assert_eq!(request.depth, DEFAULT_SEARCH_DEPTH);
}
