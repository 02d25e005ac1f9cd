//! HTTP surface: the report page, the chart data, a status document and
//! static assets.
//!
//! Handlers never render anything themselves; they serve what the last
//! published [`Snapshot`](crate::publish::Snapshot) already materialized.

use crate::errors::Result;
use crate::publish::ReportStore;
use crate::report::render_waiting;
use crate::scheduler::{CycleHistory, CycleState};
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info};

const PENDING_BODY: &str = r#"{"status":"pending"}"#;
const RETRY_AFTER_SECS: &str = "15";

/// Shared handler state. Cloned per request; everything inside is an `Arc`
/// or a watch receiver.
#[derive(Clone)]
pub struct AppState {
    store: Arc<ReportStore>,
    cycle_state: watch::Receiver<CycleState>,
    history: Arc<RwLock<CycleHistory>>,
    static_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(
        store: Arc<ReportStore>,
        cycle_state: watch::Receiver<CycleState>,
        history: Arc<RwLock<CycleHistory>>,
        static_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            cycle_state,
            history,
            static_dir: Arc::new(static_dir),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/data", get(data))
        .route("/status", get(status))
        .fallback(static_asset)
        .with_state(state)
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server ready");
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    match state.store.load() {
        Some(snapshot) => Html(snapshot.html.clone()),
        None => Html(render_waiting()),
    }
}

async fn data(State(state): State<AppState>) -> Response {
    match state.store.load() {
        Some(snapshot) => json_body(StatusCode::OK, snapshot.data_json.clone()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [
                (header::CONTENT_TYPE, "application/json; charset=utf-8"),
                (header::RETRY_AFTER, RETRY_AFTER_SECS),
            ],
            PENDING_BODY,
        )
            .into_response(),
    }
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    #[serde(flatten)]
    state: CycleState,
    last_cycle: Option<u64>,
    completed_at: Option<DateTime<Utc>>,
    records: Option<usize>,
    #[serde(flatten)]
    history: CycleHistory,
}

async fn status(State(state): State<AppState>) -> Response {
    let snapshot = state.store.load();
    let body = StatusResponse {
        state: *state.cycle_state.borrow(),
        last_cycle: snapshot.as_ref().map(|s| s.cycle),
        completed_at: snapshot.as_ref().map(|s| s.completed_at),
        records: snapshot.as_ref().map(|s| s.aggregate.record_count()),
        history: state.history.read().clone(),
    };
    match serde_json::to_string(&body) {
        Ok(json) => json_body(StatusCode::OK, json),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("json encode error: {e}"),
        )
            .into_response(),
    }
}

async fn static_asset(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    let Some(relative) = asset_path(uri.path()) else {
        return not_found();
    };
    let path = state.static_dir.join(relative);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(&path))], bytes).into_response(),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "static asset not served");
            not_found()
        }
    }
}

fn json_body(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        body,
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "not found").into_response()
}

/// Map a request path onto a path relative to the static directory.
///
/// Rejects anything that could leave the directory.
fn asset_path(request_path: &str) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains(':') => return None,
            s => out.push(s),
        }
    }
    if out.as_os_str().is_empty() {
        None
    } else {
        Some(out)
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}
