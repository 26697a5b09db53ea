//! Dashboard HTTP server.
//!
//! Every request builds its own [`DashboardSession`]: the classified
//! snapshot is loaded from disk, the query-string filter is applied, and
//! the result is rendered. No view state survives between requests.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Dashboard page; accepts `from`, `to`, repeated `category` |
//! | `GET`  | `/classified-reviews` | The classified snapshot file, verbatim |
//! | `GET`  | `/api/view` | Filtered `{ summary, data }` as JSON; same query as `/`. 404 without a snapshot, 500 if it fails to load |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "not_found", "message": "No classified_reviews.json yet" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so the snapshot can be
//! consumed by dashboards hosted elsewhere.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;
use crate::dashboard::filter::{filter_from_pairs, FilterState};
use crate::dashboard::{DashboardSession, FileSnapshotSource, SessionState};
use crate::models::{Review, Summary};

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

/// Build the router. Exposed so tests can serve it on an ephemeral port.
pub fn router(config: &Config) -> Router {
    let state = AppState {
        config: Arc::new(config.clone()),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_dashboard))
        .route("/classified-reviews", get(handle_classified))
        .route("/api/view", get(handle_view))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Bind to `[server].bind` and serve until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&config.server.bind).await?;
    serve(listener, config).await
}

/// Serve on an already-bound listener.
pub async fn serve(listener: TcpListener, config: &Config) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "dashboard server listening");
    println!("Dashboard listening on http://{}", addr);

    axum::serve(listener, router(config)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Query pairs in request order; repeated `category` keys are kept.
type QueryPairs = Query<Vec<(String, String)>>;

fn filter_from(pairs: &[(String, String)]) -> Result<FilterState, AppError> {
    filter_from_pairs(pairs).map_err(bad_request)
}

/// A fresh session loaded from the classified file with `filter` applied.
async fn session_for(config: &Config, filter: FilterState) -> DashboardSession {
    let source = FileSnapshotSource::new(config.storage.classified_path());
    let mut session = DashboardSession::new();
    if session.load(&source).await {
        session.apply_filters(filter);
    }
    session
}

/// A missing snapshot is a 404; one that exists but does not load is a 500
/// carrying the load error.
fn unavailable(config: &Config, state: &SessionState) -> AppError {
    let path = config.storage.classified_path();
    match state {
        SessionState::Unavailable(msg) if path.exists() => internal(msg.clone()),
        _ => not_found(format!("No {} yet", config.storage.classified_file)),
    }
}

// ============ GET / ============

async fn handle_dashboard(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Result<Html<String>, AppError> {
    let filter = filter_from(&pairs)?;
    let mut session = session_for(&state.config, filter).await;
    Ok(Html(session.render_html()))
}

// ============ GET /classified-reviews ============

async fn handle_classified(State(state): State<AppState>) -> Result<Response, AppError> {
    let path = state.config.storage.classified_path();
    match tokio::fs::read_to_string(&path).await {
        Ok(body) => Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found(format!(
            "No {} yet",
            state.config.storage.classified_file
        ))),
        Err(e) => Err(internal(format!("reading {}: {}", path.display(), e))),
    }
}

// ============ GET /api/view ============

#[derive(Serialize)]
struct ViewResponse {
    summary: Summary,
    data: Vec<Review>,
}

async fn handle_view(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> Result<Json<ViewResponse>, AppError> {
    let filter = filter_from(&pairs)?;
    let session = session_for(&state.config, filter).await;
    let Some(view) = session.view() else {
        return Err(unavailable(&state.config, session.state()));
    };

    Ok(Json(ViewResponse {
        summary: (*view.summary).clone(),
        data: (*view.data).clone(),
    }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
