// All service modules
pub mod balance_fetcher;
pub mod chain_directory;
pub mod enricher;
pub mod portfolio;
pub mod portfolio_filter;
pub mod response_cache;
pub mod router_state;
pub mod token_metadata;

#[cfg(test)]
pub mod testing;

// Re-export for convenience
pub use portfolio::PortfolioAggregator;
pub use portfolio_filter::PortfolioView;
pub use response_cache::ResponseCache;

use crate::constants::CACHE_SWEEP_INTERVAL_SECS;
use std::time::Duration;

/// Start all background services
pub fn start_background_services(cache: ResponseCache) {
    tracing::info!("Starting background services...");

    if cache.is_enabled() {
        cache.spawn_sweeper(Duration::from_secs(CACHE_SWEEP_INTERVAL_SECS));
    } else {
        tracing::warn!("Response cache disabled; sweeper not started");
    }

    tracing::info!("All background services started successfully");
}
