use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{HeaderValue, Request, StatusCode};
use axum::Router;
use patchfinder_core::{
    CaptureTransport, PollError, SessionError, SessionManager, TransportError,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::server::{router, ApiError, AppState};

fn capture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../patchfinder-core/fixtures/c9300")
}

fn app(dir: PathBuf, token: Option<&str>) -> Router {
    let sessions = Arc::new(SessionManager::new(move || CaptureTransport::new(dir.clone())));
    router(
        AppState::new(sessions, token.map(str::to_string)),
        HeaderValue::from_static("http://localhost:5173"),
    )
}

fn connect_request(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/connect")
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder
        .body(Body::from(
            r#"{"ip":"10.0.0.2","username":"netops","password":"secret"}"#,
        ))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn connect_returns_report_json() {
    // Arrange
    let app = app(capture_dir(), Some("t0ken"));

    // Act
    let response = app
        .clone()
        .oneshot(connect_request(Some("t0ken")))
        .await
        .expect("response");

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["hostname"], "SW-ACCESS-01");
    assert_eq!(body["uptime"], "12 weeks, 3 days, 4 hours, 51 minutes");
    assert_eq!(body["disconnected_ports"].as_array().map(Vec::len), Some(4));
    assert!(body["disconnected_ports"][0]["usage_percentage"].is_null());
    assert_eq!(body["poe_status"][0]["switch_no"], "1");
    assert_eq!(body["poe_status"][1]["free"], "0.0");
    assert_eq!(body["lowest_usage_interface"]["interface"], "Gi1/0/2");

    let health = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let health = json_body(health).await;
    assert_eq!(health["session"], "10.0.0.2");
    assert_eq!(health["busy"], false);
}

#[tokio::test]
async fn missing_or_wrong_token_is_rejected() {
    let app = app(capture_dir(), Some("t0ken"));

    let missing = app.clone().oneshot(connect_request(None)).await.expect("response");
    let wrong = app.oneshot(connect_request(Some("nope"))).await.expect("response");

    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn disconnect_closes_the_session() {
    // Arrange
    let app = app(capture_dir(), None);
    let connected = app.clone().oneshot(connect_request(None)).await.expect("response");
    assert_eq!(connected.status(), StatusCode::OK);

    // Act
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/disconnect")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "disconnected");

    let health = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert!(json_body(health).await["session"].is_null());
}

#[tokio::test]
async fn device_failure_maps_to_server_error() {
    let app = app(PathBuf::from("/nonexistent/patchfinder-capture"), None);
    let response = app.oneshot(connect_request(None)).await.expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(response).await["detail"].is_string());
}

#[test]
fn session_errors_map_to_distinct_statuses() {
    let auth = ApiError::from(SessionError::Poll(PollError::Transport(
        TransportError::AuthenticationFailed,
    )));
    let timeout = ApiError::from(SessionError::Poll(PollError::Transport(
        TransportError::ConnectionTimeout,
    )));
    let busy = ApiError::from(SessionError::Busy);
    let hostname = ApiError::from(SessionError::Poll(PollError::MissingHostname));

    assert_eq!(auth.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(timeout.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(busy.status(), StatusCode::CONFLICT);
    assert_eq!(hostname.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
