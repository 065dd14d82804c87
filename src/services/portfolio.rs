use axum::body::Bytes;
use std::sync::Arc;

use crate::{
    config::Config,
    error::Result,
    integrations::EuclidGateway,
    models::ChainResult,
    services::{
        balance_fetcher::BalanceFetcher,
        chain_directory::{narrow_chains, ChainDirectory},
        enricher::enrich_all,
        portfolio_filter::PortfolioView,
        response_cache::{CacheKey, ResponseCache},
        router_state::RouterStateResolver,
        token_metadata::TokenMetadataIndex,
    },
    utils::validate_evm_address,
};

/// Turns one wallet address into per-chain, priced balances.
#[derive(Clone)]
pub struct PortfolioAggregator {
    gateway: Arc<dyn EuclidGateway>,
    directory: ChainDirectory,
    router: RouterStateResolver,
    fetcher: BalanceFetcher,
    cache: ResponseCache,
}

impl PortfolioAggregator {
    pub fn new(gateway: Arc<dyn EuclidGateway>, config: &Config, cache: ResponseCache) -> Self {
        Self {
            directory: ChainDirectory::new(gateway.clone()),
            router: RouterStateResolver::new(gateway.clone()),
            fetcher: BalanceFetcher::new(
                gateway.clone(),
                config.hub_chain_uid.clone(),
                config.balance_page_limit,
            ),
            gateway,
            cache,
        }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn gateway_endpoint(&self) -> &str {
        self.gateway.endpoint()
    }

    /// JSON payload for `address` under `view`, served from the response cache
    /// when a fresh entry exists.
    pub async fn balances_payload(&self, address: &str, view: &PortfolioView) -> Result<Bytes> {
        let address = validate_evm_address(address)?;
        let key = CacheKey::new(&address, view);

        if let Some(payload) = self.cache.get(&key).await {
            tracing::debug!("Response cache hit for {}", address);
            return Ok(payload);
        }

        let chains = self.aggregate(&address, view).await?;
        let payload = Bytes::from(serde_json::to_vec(&chains)?);
        self.cache.insert(key, payload.clone()).await;
        Ok(payload)
    }

    /// Runs the full pipeline without touching the cache.
    pub async fn aggregate(&self, address: &str, view: &PortfolioView) -> Result<Vec<ChainResult>> {
        let address = validate_evm_address(address)?;
        let started = std::time::Instant::now();
        tracing::info!(
            "Aggregating balances for {} (chain={}, sort={})",
            address,
            view.chain.as_key(),
            view.sort.as_str()
        );

        let (chains, virtual_balance_address, index) = tokio::try_join!(
            self.directory.evm_chains(),
            self.router.virtual_balance_address(),
            TokenMetadataIndex::fetch(self.gateway.clone()),
        )?;

        let chains = narrow_chains(chains, &view.chain);
        let fetches = self
            .fetcher
            .fetch(&address, chains, &virtual_balance_address)
            .await?;
        let results = view.apply(enrich_all(fetches, &index));

        let failed = results.iter().filter(|r| r.error.is_some()).count();
        tracing::info!(
            "Aggregated {} chains ({} failed) for {} in {:?}",
            results.len(),
            failed,
            address,
            started.elapsed()
        );
        Ok(results)
    }

    pub async fn chain_names(&self) -> Result<Vec<String>> {
        self.directory.display_names().await
    }
}
