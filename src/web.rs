// Prepaid Ledger Viewer - Web routes
// Every request re-runs the pipeline; nothing is kept between requests
// except what the source's own cache holds.

use crate::config::Settings;
use crate::error::LedgerError;
use crate::ledger::Snapshot;
use crate::pipeline::load_snapshot;
use crate::source::LedgerSource;
use crate::view::{render, Page};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn LedgerSource>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(source: impl LedgerSource + 'static, settings: Settings) -> Self {
        Self {
            source: Arc::new(source),
            settings: Arc::new(settings),
        }
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }

    fn failed(data: T, err: &LedgerError) -> Self {
        Self {
            success: false,
            data,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    store: Option<String>,
}

/// Read the sheet on the blocking pool; the CSV read is synchronous file I/O.
async fn fetch_snapshot(state: &AppState) -> Result<Snapshot, LedgerError> {
    let source = Arc::clone(&state.source);
    let settings = Arc::clone(&state.settings);

    tokio::task::spawn_blocking(move || load_snapshot(source.as_ref(), &settings))
        .await
        .map_err(LedgerError::data_source)?
}

fn status_for(err: &LedgerError) -> StatusCode {
    if err.is_data_source() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/page?store= - Full page for one store (default: first store)
async fn get_page(State(state): State<AppState>, Query(query): Query<PageQuery>) -> impl IntoResponse {
    let selection = query.store.as_deref().filter(|s| !s.is_empty());

    match fetch_snapshot(&state).await {
        Ok(snapshot) => {
            let page = render(&snapshot, selection, &state.settings);
            (StatusCode::OK, Json(ApiResponse::ok(page))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Error rendering page");
            (status_for(&e), Json(ApiResponse::failed(Page::failure(&e), &e))).into_response()
        }
    }
}

/// GET /api/stores - Store names in first-seen order
async fn get_stores(State(state): State<AppState>) -> impl IntoResponse {
    match fetch_snapshot(&state).await {
        Ok(snapshot) => {
            let stores: Vec<String> = snapshot.counterparties().into_iter().map(str::to_string).collect();
            (StatusCode::OK, Json(ApiResponse::ok(stores))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Error listing stores");
            (status_for(&e), Json(ApiResponse::failed(Vec::<String>::new(), &e))).into_response()
        }
    }
}

/// GET / - Serve index.html
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/page", get(get_page))
        .route("/stores", get(get_stores))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
