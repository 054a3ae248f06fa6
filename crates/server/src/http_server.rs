//! HTTP surface: submission intake, key-gated admin view and download,
//! static landing pages as the router fallback.

use std::{net::SocketAddr, path::Path, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{ConnectInfo, Extension, Query},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap, Method, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    admin,
    auth::AdminGate,
    config::ServerConfig,
    error::ServiceError,
    record::{self, Submission, TimestampFormat},
    store::SubmissionLog,
};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    log: SubmissionLog,
    gate: AdminGate,
    admin_key: String,
    log_file_name: String,
    timestamp_format: TimestampFormat,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        if let Some(parent) = config.log_file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory {}", parent.display())
                })?;
            }
        }

        let log_file_name = config
            .log_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "submissions.txt".to_string());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                log: SubmissionLog::new(config.log_file.clone()),
                gate: AdminGate::new(&config.admin_key),
                admin_key: config.admin_key.clone(),
                log_file_name,
                timestamp_format: config.timestamp_format,
            }),
        })
    }

    fn authorize(&self, supplied_key: &str) -> Result<(), ServiceError> {
        if self.inner.gate.verify(supplied_key) {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized)
        }
    }

    fn record_submission(&self, submission: Submission, ip: &str) -> Result<(), ServiceError> {
        let line = record::format_line(&submission, ip, Utc::now(), self.inner.timestamp_format);
        self.inner.log.append_line(&line)?;
        tracing::info!(kind = submission.kind(), ip, "submission recorded");
        Ok(())
    }

    fn log(&self) -> &SubmissionLog {
        &self.inner.log
    }

    fn admin_key(&self) -> &str {
        &self.inner.admin_key
    }

    fn log_file_name(&self) -> &str {
        &self.inner.log_file_name
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "message": message })),
            )
                .into_response(),
            ServiceError::Unauthorized => {
                (StatusCode::FORBIDDEN, "Unauthorized.").into_response()
            }
            ServiceError::NotFound => {
                (StatusCode::NOT_FOUND, "No submissions recorded yet.").into_response()
            }
            ServiceError::Io(err) => {
                tracing::error!("submission log I/O error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "ok": false })),
                )
                    .into_response()
            }
        }
    }
}

#[derive(Deserialize)]
struct EmailBody {
    email: Option<String>,
}

#[derive(Deserialize)]
struct UidLevelBody {
    uid: Option<String>,
    level: Option<String>,
}

#[derive(Deserialize)]
struct CodeBody {
    email: Option<String>,
    code: Option<String>,
}

#[derive(Deserialize)]
struct KeyQuery {
    #[serde(default)]
    key: String,
}

pub fn router(state: AppState, public_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/submit", post(submit_email))
        .route("/submit-uid", post(submit_uid_level))
        .route("/submit-code", post(submit_code))
        .route("/admin", get(admin_view))
        .route("/download", get(download_log))
        .fallback_service(ServeDir::new(public_dir))
        .layer(Extension(state))
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the listener fails.
pub async fn run(config: ServerConfig) -> Result<()> {
    let state = AppState::new(&config)?;
    let router = router(state, &config.public_dir);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?;

    tracing::info!("formdrop listening on {addr}");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("HTTP server encountered an unrecoverable error")?;

    Ok(())
}

async fn submit_email(
    Extension(state): Extension<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<EmailBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let submission = Submission::email(body.email)?;
    state.record_submission(submission, &client_ip(&headers, addr))?;
    Ok(Json(json!({ "ok": true })))
}

async fn submit_uid_level(
    Extension(state): Extension<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<UidLevelBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let submission = Submission::uid_level(body.uid, body.level)?;
    state.record_submission(submission, &client_ip(&headers, addr))?;
    Ok(Json(json!({ "ok": true, "message": "Submission received." })))
}

async fn submit_code(
    Extension(state): Extension<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<CodeBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let submission = Submission::code(body.email, body.code)?;
    state.record_submission(submission, &client_ip(&headers, addr))?;
    Ok(Json(json!({ "ok": true, "message": "Code received." })))
}

async fn admin_view(
    Extension(state): Extension<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Html<String>, ServiceError> {
    state.authorize(&query.key)?;

    let contents = state.log().read_all()?;
    Ok(Html(admin::render_page(
        contents.as_deref(),
        state.admin_key(),
        state.log_file_name(),
    )))
}

async fn download_log(
    Extension(state): Extension<AppState>,
    Query(query): Query<KeyQuery>,
) -> Result<Response, ServiceError> {
    state.authorize(&query.key)?;

    // Single read, no existence pre-check: a file that vanishes in between
    // must still report 404, not 500.
    let bytes = match tokio::fs::read(state.log().path()).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServiceError::NotFound)
        }
        Err(err) => return Err(err.into()),
    };
    let disposition = format!("attachment; filename=\"{}\"", state.log_file_name());

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any)
}

/// Client address: first `X-Forwarded-For` hop, else the peer socket.
fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}
