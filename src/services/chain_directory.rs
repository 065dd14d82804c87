use std::sync::Arc;

use crate::{
    error::Result,
    integrations::{euclid::ChainRecord, EuclidGateway},
    models::Chain,
    services::portfolio_filter::ChainFilter,
    utils::{is_evm_factory, non_blank},
};

/// Resolves the EVM subset of the gateway's chain catalog.
#[derive(Clone)]
pub struct ChainDirectory {
    gateway: Arc<dyn EuclidGateway>,
}

impl ChainDirectory {
    pub fn new(gateway: Arc<dyn EuclidGateway>) -> Self {
        Self { gateway }
    }

    /// All EVM chains in upstream order.
    pub async fn evm_chains(&self) -> Result<Vec<Chain>> {
        let records = self.gateway.all_chains().await?;
        let total = records.len();
        let chains = evm_chains_from_records(records);
        tracing::info!("Chain directory: {} of {} chains are EVM", chains.len(), total);
        Ok(chains)
    }

    /// Sorted display names of every EVM chain.
    pub async fn display_names(&self) -> Result<Vec<String>> {
        Ok(sorted_display_names(&self.evm_chains().await?))
    }
}

pub fn evm_chains_from_records(records: Vec<ChainRecord>) -> Vec<Chain> {
    records
        .into_iter()
        .filter(|record| {
            record
                .factory_address
                .as_deref()
                .map(is_evm_factory)
                .unwrap_or(false)
        })
        .map(chain_from_record)
        .collect()
}

// Blank names fall back to the chain uid; blank logos become absent.
fn chain_from_record(record: ChainRecord) -> Chain {
    let display_name = non_blank(record.display_name.as_deref())
        .unwrap_or(record.chain_uid.as_str())
        .to_string();
    let chain_img = non_blank(record.logo.as_deref()).map(str::to_string);

    Chain {
        display_name,
        chain_img,
        factory_address: record.factory_address.unwrap_or_default(),
        chain_uid: record.chain_uid,
    }
}

/// Narrows the chain set before any balance query is built.
pub fn narrow_chains(chains: Vec<Chain>, filter: &ChainFilter) -> Vec<Chain> {
    chains.into_iter().filter(|chain| filter.matches(chain)).collect()
}

pub fn sorted_display_names(chains: &[Chain]) -> Vec<String> {
    let mut names: Vec<String> = chains.iter().map(|c| c.display_name.clone()).collect();
    names.sort();
    names
}
