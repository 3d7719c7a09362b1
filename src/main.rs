//! Card Game Gateway - real-time event gateway for the card game backend
//!
//! This is the main entry point for the gateway. It handles:
//! - WebSocket connections for real-time play
//! - Per-connection admission control of inbound events
//! - Health and rate limit diagnostics over HTTP

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use card_game_gateway::app::AppState;
use card_game_gateway::config::Config;
use card_game_gateway::game::log_events;
use card_game_gateway::http::build_router;
use card_game_gateway::ratelimit::RateLimiter;
use card_game_gateway::util::time::init_server_time;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level);

    // Initialize server time tracking
    init_server_time();

    info!("Starting Card Game Gateway");
    info!("Server address: {}", config.server_addr);
    for (category, budget) in config.rate_limits.iter() {
        info!(
            category = %category,
            max_requests = budget.max_requests,
            window_ms = budget.window_ms,
            "Rate limit configured"
        );
    }

    // Create application state
    let (state, events_rx) = AppState::new(config.clone());

    // Spawn game event consumer
    tokio::spawn(log_events(events_rx));

    // Spawn idle sweep if enabled
    if let Some(interval) = config.sweep_interval {
        info!(interval_secs = interval.as_secs(), "Idle rate limit sweep enabled");
        tokio::spawn(run_sweep(state.rate_limiter.clone(), interval));
    }

    let rate_limiter = state.rate_limiter.clone();

    // Build router
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = config.server_addr;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("Health check: http://{}/health", addr);
    info!("WebSocket endpoint: ws://{}/ws", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    rate_limiter.clear_all_rate_limits();

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Periodically drop identifiers whose windows have emptied
async fn run_sweep(rate_limiter: Arc<RateLimiter>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // First tick completes immediately
    interval.tick().await;

    loop {
        interval.tick().await;
        rate_limiter.sweep_idle();
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        }
    }
}
