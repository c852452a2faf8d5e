//! Analysis backend client tests against an in-process fake service
//!
//! Test IDs:
//! - TC-B-001: Successful analysis
//! - TC-B-002: Service error with payload
//! - TC-B-003: Service error without payload
//! - TC-B-004: Unusable success body
//! - TC-B-005: Transport failures

use assistant_audio::error::BackendErrorKind;
use assistant_audio::models::{AudioData, BpmValue};
use assistant_audio::services::{AudioAnalyzer, BackendClient};
use axum::extract::Path as UrlPath;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

async fn analyze(UrlPath(track): UrlPath<String>) -> Response {
    match track.as_str() {
        "House/Artist - Song #1.mp3" => Json(json!({"bpm": 128, "initial_key": "5A"})).into_response(),
        "Ambient/Drone.flac" => Json(json!({"bpm": 72.5, "initial_key": "11B"})).into_response(),
        "broken.mp3" => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"command": "keyfinder-cli", "message": "no audio stream"})),
        )
            .into_response(),
        "garbage.mp3" => (StatusCode::OK, "definitely not json").into_response(),
        "partial.mp3" => Json(json!({"bpm": 128})).into_response(),
        "slow.mp3" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"bpm": 128, "initial_key": "5A"})).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start the fake backend and return its base URL
async fn spawn_backend() -> String {
    let app = Router::new().route("/track/:path", get(analyze));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn client(timeout: Duration) -> BackendClient {
    let base_url = spawn_backend().await;
    BackendClient::new(&base_url, timeout).expect("Failed to create client")
}

#[tokio::test]
async fn tc_b_001_computes_audio_data() {
    let client = client(Duration::from_secs(10)).await;

    let data = client
        .compute_audio_data(Path::new("House/Artist - Song #1.mp3"))
        .await
        .unwrap();
    assert_eq!(data, AudioData::new(128, "5A"));

    let data = client
        .compute_audio_data(Path::new("Ambient/Drone.flac"))
        .await
        .unwrap();
    assert_eq!(data.bpm, BpmValue::Float(72.5));
    assert_eq!(data.initial_key, "11B");
}

#[tokio::test]
async fn tc_b_002_error_payload_becomes_message() {
    let client = client(Duration::from_secs(10)).await;

    let err = client
        .compute_audio_data(Path::new("broken.mp3"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, BackendErrorKind::Service);
    assert_eq!(err.message, "keyfinder-cli: no audio stream");
    assert_eq!(err.code, 422);
}

#[tokio::test]
async fn tc_b_003_status_without_payload() {
    let client = client(Duration::from_secs(10)).await;

    let err = client
        .compute_audio_data(Path::new("unknown.mp3"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, BackendErrorKind::Service);
    assert_eq!(err.message, "HTTP 404 Not Found");
    assert_eq!(err.code, 404);
}

#[tokio::test]
async fn tc_b_004_unusable_success_body() {
    let client = client(Duration::from_secs(10)).await;

    for track in ["garbage.mp3", "partial.mp3"] {
        let err = client.compute_audio_data(Path::new(track)).await.unwrap_err();
        assert_eq!(err.kind, BackendErrorKind::InvalidResponse, "{}", track);
        assert_eq!(err.code, 200);
    }
}

#[tokio::test]
async fn tc_b_005_timeout() {
    let client = client(Duration::from_millis(200)).await;

    let err = client
        .compute_audio_data(Path::new("slow.mp3"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, BackendErrorKind::Timeout);
    assert_eq!(err.code, 500);
}

#[tokio::test]
async fn tc_b_005_connection_refused() {
    // Bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BackendClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let err = client
        .compute_audio_data(Path::new("a.mp3"))
        .await
        .unwrap_err();

    assert_eq!(err.kind, BackendErrorKind::Transport);
    assert_eq!(err.code, 500);
    assert!(!err.message.is_empty());
}
