//! HTTP surface of the gateway: health, registry listing, status view

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use card_game_gateway::app::AppState;
use card_game_gateway::config::Config;
use card_game_gateway::http::build_router;
use card_game_gateway::ratelimit::{EventCategory, RateLimitRegistry, RateLimiter};
use card_game_gateway::util::time::ManualClock;

fn test_app(registry: RateLimitRegistry) -> (Router, Arc<RateLimiter>, Arc<ManualClock>) {
    let config = Config::from_lookup(|_| None).expect("default config");
    let clock = Arc::new(ManualClock::new(0));
    let limiter = RateLimiter::with_clock(registry, clock.clone());
    let (state, _events_rx) = AppState::with_limiter(config, limiter);
    let limiter = state.rate_limiter.clone();
    (build_router(state), limiter, clock)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn test_health_reports_tracked_identifiers() {
    let (app, limiter, _clock) = test_app(RateLimitRegistry::default());
    limiter.check_rate_limit("p1", EventCategory::PlayCards);
    limiter.check_rate_limit("p2", EventCategory::PlayCards);

    let (status, body) = get_json(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tracked_identifiers"], 2);
}

#[tokio::test]
async fn test_registry_listing() {
    let registry = RateLimitRegistry::default().without(EventCategory::EmoteSent);
    let (app, _limiter, _clock) = test_app(registry);

    let (status, body) = get_json(app, "/ratelimits").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"category": "play_cards", "max_requests": 10, "window_ms": 5000},
            {"category": "pass_turn", "max_requests": 5, "window_ms": 5000},
            {"category": "get_public_rooms", "max_requests": 10, "window_ms": 10000},
            {"category": "request_sync", "max_requests": 5, "window_ms": 10000},
        ])
    );
}

#[tokio::test]
async fn test_status_view() {
    let (app, limiter, clock) = test_app(RateLimitRegistry::default());
    clock.set(120);
    limiter.check_rate_limit("p1", EventCategory::PassTurn);
    clock.set(300);
    limiter.check_rate_limit("p1", EventCategory::PassTurn);

    let (status, body) = get_json(app, "/ratelimits/p1/pass_turn").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"count": 2, "max_requests": 5, "window_ms": 5000, "oldest_timestamp": 120})
    );
}

#[tokio::test]
async fn test_status_for_unseen_identifier() {
    let (app, limiter, _clock) = test_app(RateLimitRegistry::default());

    let (status, body) = get_json(app, "/ratelimits/nobody/request_sync").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"count": 0, "max_requests": 5, "window_ms": 10000}));
    assert_eq!(limiter.tracked_identifiers(), 0);
}

#[tokio::test]
async fn test_status_unknown_or_unconfigured_category() {
    let registry = RateLimitRegistry::default().without(EventCategory::RequestSync);

    let (app, _limiter, _clock) = test_app(registry.clone());
    let (status, _body) = get_json(app, "/ratelimits/p1/send_gift").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (app, _limiter, _clock) = test_app(registry);
    let (status, body) = get_json(app, "/ratelimits/p1/request_sync").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("request_sync"));
}
