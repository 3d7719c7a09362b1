//! HTTP route definitions

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::app::AppState;
use crate::ratelimit::{EventCategory, RateLimitStatus};
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .route("/ratelimits", get(registry_handler))
        .route("/ratelimits/:identifier/:category", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    tracked_identifiers: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        tracked_identifiers: state.rate_limiter.tracked_identifiers(),
    })
}

// ============================================================================
// Rate limit endpoints
// ============================================================================

#[derive(Serialize)]
struct BudgetEntry {
    category: EventCategory,
    max_requests: usize,
    window_ms: u64,
}

async fn registry_handler(State(state): State<AppState>) -> Json<Vec<BudgetEntry>> {
    let budgets = state
        .rate_limiter
        .registry()
        .iter()
        .map(|(category, config)| BudgetEntry {
            category,
            max_requests: config.max_requests,
            window_ms: config.window_ms,
        })
        .collect();

    Json(budgets)
}

async fn status_handler(
    State(state): State<AppState>,
    Path((identifier, category)): Path<(String, String)>,
) -> Result<Json<RateLimitStatus>, AppError> {
    let category: EventCategory = category
        .parse()
        .map_err(|e: crate::ratelimit::UnknownCategory| AppError::NotFound(e.to_string()))?;

    state
        .rate_limiter
        .get_rate_limit_status(&identifier, category)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No rate limit configured for {}", category)))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
