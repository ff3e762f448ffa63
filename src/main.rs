use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod chain;
mod config;
mod constants;
mod error;
mod models;
mod services;
mod utils;
mod websocket;

use chain::{ContractCaller, EthersContractCaller, JsonRpcWallet, WalletProvider};
use config::Config;
use constants::API_VERSION;
use services::{PollingScheduler, StatsAggregator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voxel_miner_stats=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting miner stats service");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);
    tracing::info!(
        "Poll interval: {}s, RPC call timeout: {}s",
        config.poll_interval_secs,
        config.rpc_call_timeout_secs
    );

    // Contract reads
    let caller: Arc<dyn ContractCaller> = Arc::new(EthersContractCaller::from_config(&config)?);
    let aggregator = StatsAggregator::from_config(&config, caller)?;
    let scheduler = Arc::new(PollingScheduler::new(
        Arc::new(aggregator),
        config.poll_interval(),
    ));

    // Wallet capability
    let wallet: Option<Arc<dyn WalletProvider>> = match config.wallet_rpc_url.as_deref() {
        Some(url) => Some(Arc::new(JsonRpcWallet::new(url)?)),
        None => None,
    };

    let app_state = api::AppState::new(config.clone(), scheduler.clone(), wallet);

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Snapshot
        .route("/api/v1/snapshot", get(api::snapshot::get_snapshot))
        // Wallet
        .route("/api/v1/wallet/connect", post(api::wallet::connect_wallet))
        .route(
            "/api/v1/wallet/disconnect",
            post(api::wallet::disconnect_wallet),
        )
        // WebSocket endpoints
        .route("/ws/snapshots", get(websocket::snapshots::handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
