use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    error::Result,
    integrations::{euclid::TokenMetadataRecord, EuclidGateway},
    models::TokenMetadata,
    utils::non_blank,
};

/// Per-request lookup table of token metadata keyed by token id.
#[derive(Debug, Clone, Default)]
pub struct TokenMetadataIndex {
    by_token_id: HashMap<String, TokenMetadata>,
}

impl TokenMetadataIndex {
    pub async fn fetch(gateway: Arc<dyn EuclidGateway>) -> Result<Self> {
        let records = gateway.token_metadatas().await?;
        let index = Self::from_records(records);
        if index.is_empty() {
            tracing::warn!("Token metadata catalog is empty; balances will be unpriced");
        }
        tracing::info!("Token metadata index built with {} entries", index.len());
        Ok(index)
    }

    pub fn from_records(records: Vec<TokenMetadataRecord>) -> Self {
        let by_token_id = records
            .into_iter()
            .map(|record| {
                let metadata = TokenMetadata {
                    display_name: non_blank(record.display_name.as_deref()).map(str::to_string),
                    image: non_blank(record.image.as_deref()).map(str::to_string),
                    price: non_blank(record.price.as_deref()).map(str::to_string),
                    coin_decimal: record.coin_decimal,
                    token_id: record.token_id,
                };
                (metadata.token_id.clone(), metadata)
            })
            .collect();

        Self { by_token_id }
    }

    pub fn get(&self, token_id: &str) -> Option<&TokenMetadata> {
        self.by_token_id.get(token_id)
    }

    pub fn len(&self) -> usize {
        self.by_token_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token_id.is_empty()
    }
}
