// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Read-only surface for the dashboard client. A read that finds the cache
// stale or empty requests a background refresh and still answers from the
// last good generation (stale-while-revalidate); only a cache that has never
// been filled returns 503 so the client can retry with backoff.
//
// CORS is configured permissively for GETs; the API exposes no mutations.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::aggregate::{summarize, top_picks};
use crate::app_state::AppState;

/// Build the full REST router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/stocks", get(stocks))
        .route("/api/stock/:symbol", get(stock))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Liveness
// =============================================================================

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Swing Scanner API",
    }))
}

// =============================================================================
// Health
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cache = &state.cache;
    Json(serde_json::json!({
        "status": "healthy",
        "cacheAgeSecs": cache.age_secs(),
        "stocksCached": cache.current().map(|g| g.snapshots.len()).unwrap_or(0),
        "refreshing": cache.is_refreshing(),
        "lastError": cache.last_error(),
        "uptimeSecs": state.start_time.elapsed().as_secs(),
    }))
}

// =============================================================================
// Universe board
// =============================================================================

async fn stocks(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let cache = &state.cache;

    // Stale or empty: kick the scheduler, then answer from what we have.
    if !cache.is_fresh() {
        state.request_refresh();
    }

    match cache.current() {
        Some(generation) => {
            let data_source = state.config.read().data_source.clone();
            Json(serde_json::json!({
                "stocks": &generation.snapshots,
                "nifty": &generation.index,
                "summary": summarize(&generation.snapshots),
                "topPicks": top_picks(&generation.snapshots, 3),
                "fetchedAt": generation.built_at.to_rfc3339(),
                "nextRefresh": cache.next_refresh_secs(),
                "dataSource": data_source,
            }))
            .into_response()
        }
        None => warming_up().into_response(),
    }
}

// =============================================================================
// Single symbol
// =============================================================================

async fn stock(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    let cache = &state.cache;
    if !cache.is_fresh() {
        state.request_refresh();
    }

    let Some(generation) = cache.current() else {
        return warming_up().into_response();
    };

    match generation.get(&symbol) {
        Some(snapshot) => Json(snapshot).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": format!("unknown symbol: {symbol}"),
            })),
        )
            .into_response(),
    }
}

fn warming_up() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "error": "Fetching data for the first time, please retry in 30 seconds",
            "fetching": true,
        })),
    )
}
