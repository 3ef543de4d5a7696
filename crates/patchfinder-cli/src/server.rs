use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use patchfinder_core::{
    Credentials, DeviceTarget, DeviceTransport, PollError, SessionError, SessionManager,
    SessionState, SwitchReport, TransportError,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub allowed_origin: String,
    pub api_token: Option<String>,
}

pub struct AppState<T: DeviceTransport> {
    sessions: Arc<SessionManager<T>>,
    api_token: Option<Arc<str>>,
}

impl<T: DeviceTransport> AppState<T> {
    pub fn new(sessions: Arc<SessionManager<T>>, api_token: Option<String>) -> Self {
        Self {
            sessions,
            api_token: api_token.map(Arc::from),
        }
    }
}

impl<T: DeviceTransport> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            api_token: self.api_token.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub ip: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            detail: "Not authenticated".to_string(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        let (status, detail) = match &err {
            SessionError::Busy => (StatusCode::CONFLICT, err.to_string()),
            SessionError::Poll(PollError::Transport(TransportError::AuthenticationFailed)) => {
                (StatusCode::UNAUTHORIZED, "SSH authentication failed".to_string())
            }
            SessionError::Poll(PollError::Transport(TransportError::ConnectionTimeout)) => {
                (StatusCode::REQUEST_TIMEOUT, "Connection timeout".to_string())
            }
            SessionError::Poll(other) => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };
        Self { status, detail }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.detail }))).into_response()
    }
}

fn authorize<T: DeviceTransport>(state: &AppState<T>, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(token) = state.api_token.as_deref() else {
        return Ok(());
    };
    let presented = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if presented == Some(token) {
        Ok(())
    } else {
        Err(ApiError::unauthorized())
    }
}

async fn connect_switch<T: DeviceTransport + 'static>(
    State(state): State<AppState<T>>,
    headers: HeaderMap,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<SwitchReport>, ApiError> {
    authorize(&state, &headers)?;
    info!(host = %request.ip, username = %request.username, "connect requested");

    let target = DeviceTarget::new(
        request.ip,
        Credentials::new(request.username, request.password),
    );
    let report = state.sessions.connect(&target).await.map_err(|err| {
        warn!(host = %target.host, error = %err, "connect failed");
        ApiError::from(err)
    })?;
    Ok(Json(report))
}

async fn disconnect_switch<T: DeviceTransport + 'static>(
    State(state): State<AppState<T>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    state.sessions.disconnect().await?;
    Ok(Json(json!({ "status": "disconnected" })))
}

async fn health<T: DeviceTransport + 'static>(State(state): State<AppState<T>>) -> Json<serde_json::Value> {
    let (session, busy) = match state.sessions.state() {
        SessionState::Idle => (None, false),
        SessionState::Active(host) => (Some(host), false),
        SessionState::Busy => (None, true),
    };
    Json(json!({ "status": "ok", "session": session, "busy": busy }))
}

pub fn router<T: DeviceTransport + 'static>(state: AppState<T>, allowed_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .route("/api/connect", post(connect_switch::<T>))
        .route("/api/disconnect", post(disconnect_switch::<T>))
        .route("/api/health", get(health::<T>))
        .layer(cors)
        .with_state(state)
}

pub async fn serve<T, F>(config: ServerConfig, factory: F) -> Result<()>
where
    T: DeviceTransport + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    let origin = HeaderValue::from_str(&config.allowed_origin)
        .with_context(|| format!("invalid CORS origin {}", config.allowed_origin))?;
    if config.api_token.is_none() {
        warn!("no API token configured, the HTTP API is unauthenticated");
    }

    let sessions = Arc::new(SessionManager::new(factory));
    let app = router(AppState::new(sessions.clone(), config.api_token), origin);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, "http api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            warn!("received ctrl-c, stopping");
        })
        .await?;

    if let Err(err) = sessions.disconnect().await {
        warn!(error = %err, "failed to close device session on shutdown");
    }
    Ok(())
}
