use axum::http::HeaderValue;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod error;
mod integrations;
mod models;
mod services;
mod utils;

use config::Config;
use integrations::{EuclidClient, EuclidGateway, GraphQlClient};
use services::{PortfolioAggregator, ResponseCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "euclid_portfolio=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Euclid portfolio service");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("GraphQL gateway: {}", config.graphql_url);
    tracing::info!("Hub chain: {}", config.hub_chain_uid);

    // Upstream gateway
    let graphql = GraphQlClient::from_config(&config)?;
    let gateway: Arc<dyn EuclidGateway> = Arc::new(EuclidClient::new(graphql));

    let cache = ResponseCache::new(Duration::from_secs(config.balance_cache_ttl_secs));
    let app_state = api::AppState {
        portfolio: PortfolioAggregator::new(gateway, &config, cache.clone()),
        config: config.clone(),
    };

    // Build router
    let app = build_router(app_state);

    // Start background services
    services::start_background_services(cache);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    let cors = cors_from_config(&state.config);

    Router::new()
        .route("/health", get(api::health::health_check))
        .route("/chains", get(api::chains::get_chains))
        .route("/balances", get(api::balances::missing_address))
        .route("/balances/{address}", get(api::balances::get_balances))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; allowing any origin");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
