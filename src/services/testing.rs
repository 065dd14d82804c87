// In-memory gateway double shared by service and handler tests.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{
    error::{AppError, Result},
    integrations::{
        euclid::{ChainRecord, RouterState, SmartQuery, SmartQueryResult, TokenMetadataRecord},
        EuclidGateway,
    },
    models::Chain,
};

#[derive(Debug, Clone)]
enum ChainBehavior {
    Success(Value),
    ChainError(String),
    TransportFailure(String),
}

#[derive(Clone)]
pub struct FakeGateway {
    chains: Vec<ChainRecord>,
    chains_error: Option<String>,
    router: Option<String>,
    router_error: Option<String>,
    tokens: Vec<TokenMetadataRecord>,
    tokens_error: Option<String>,
    balances: HashMap<String, ChainBehavior>,
    batch_error: Option<String>,
    calls: Arc<AtomicUsize>,
    multicalls: Arc<Mutex<Vec<(String, usize)>>>,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self {
            chains: Vec::new(),
            chains_error: None,
            router: Some("nibi1vbalance".to_string()),
            router_error: None,
            tokens: Vec::new(),
            tokens_error: None,
            balances: HashMap::new(),
            batch_error: None,
            calls: Arc::new(AtomicUsize::new(0)),
            multicalls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeGateway {
    pub fn with_chains(mut self, chains: Vec<ChainRecord>) -> Self {
        self.chains = chains;
        self
    }

    pub fn failing_chains(mut self, message: &str) -> Self {
        self.chains_error = Some(message.to_string());
        self
    }

    pub fn with_router(mut self, address: Option<&str>) -> Self {
        self.router = address.map(str::to_string);
        self
    }

    pub fn failing_router(mut self, message: &str) -> Self {
        self.router_error = Some(message.to_string());
        self
    }

    pub fn with_tokens(mut self, tokens: Vec<TokenMetadataRecord>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn failing_tokens(mut self, message: &str) -> Self {
        self.tokens_error = Some(message.to_string());
        self
    }

    pub fn with_balances(mut self, chain_uid: &str, success: Value) -> Self {
        self.balances
            .insert(chain_uid.to_string(), ChainBehavior::Success(success));
        self
    }

    pub fn with_chain_error(mut self, chain_uid: &str, message: &str) -> Self {
        self.balances.insert(
            chain_uid.to_string(),
            ChainBehavior::ChainError(message.to_string()),
        );
        self
    }

    /// Fails any single-chain multicall for `chain_uid` at the transport level.
    pub fn with_chain_transport_failure(mut self, chain_uid: &str, message: &str) -> Self {
        self.balances.insert(
            chain_uid.to_string(),
            ChainBehavior::TransportFailure(message.to_string()),
        );
        self
    }

    /// Fails every multicall carrying more than one query.
    pub fn failing_batch(mut self, message: &str) -> Self {
        self.batch_error = Some(message.to_string());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn multicall_calls(&self) -> Vec<(String, usize)> {
        self.multicalls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn multicall_count(&self) -> usize {
        self.multicall_calls().len()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl EuclidGateway for FakeGateway {
    async fn all_chains(&self) -> Result<Vec<ChainRecord>> {
        self.record_call();
        match &self.chains_error {
            Some(message) => Err(AppError::Upstream(message.clone())),
            None => Ok(self.chains.clone()),
        }
    }

    async fn router_state(&self) -> Result<RouterState> {
        self.record_call();
        match &self.router_error {
            Some(message) => Err(AppError::Upstream(message.clone())),
            None => Ok(RouterState {
                virtual_balance_address: self.router.clone(),
            }),
        }
    }

    async fn token_metadatas(&self) -> Result<Vec<TokenMetadataRecord>> {
        self.record_call();
        match &self.tokens_error {
            Some(message) => Err(AppError::GraphQL(message.clone())),
            None => Ok(self.tokens.clone()),
        }
    }

    async fn smart_queries(
        &self,
        chain_uid: &str,
        queries: &[SmartQuery],
    ) -> Result<Vec<SmartQueryResult>> {
        self.record_call();
        if let Ok(mut calls) = self.multicalls.lock() {
            calls.push((chain_uid.to_string(), queries.len()));
        }

        if queries.len() > 1 {
            if let Some(message) = &self.batch_error {
                return Err(AppError::Upstream(message.clone()));
            }
        }

        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            let target = &query.msg.get_user_balances.user.chain_uid;
            let result = match self.balances.get(target) {
                Some(ChainBehavior::Success(value)) => SmartQueryResult {
                    success: Some(value.clone()),
                    error: None,
                },
                Some(ChainBehavior::ChainError(message)) => SmartQueryResult {
                    success: None,
                    error: Some(message.clone()),
                },
                Some(ChainBehavior::TransportFailure(message)) => {
                    if queries.len() == 1 {
                        return Err(AppError::Upstream(message.clone()));
                    }
                    SmartQueryResult {
                        success: None,
                        error: Some(message.clone()),
                    }
                }
                None => SmartQueryResult {
                    success: Some(json!({ "balances": [] })),
                    error: None,
                },
            };
            results.push(result);
        }
        Ok(results)
    }

    fn endpoint(&self) -> &str {
        "memory://euclid"
    }
}

pub fn evm_chain(chain_uid: &str, display_name: &str) -> Chain {
    Chain {
        chain_uid: chain_uid.to_string(),
        display_name: display_name.to_string(),
        chain_img: None,
        factory_address: "0xfactory".to_string(),
    }
}

pub fn chain_record(chain_uid: &str, display_name: &str, factory_address: &str) -> ChainRecord {
    ChainRecord {
        chain_uid: chain_uid.to_string(),
        display_name: Some(display_name.to_string()),
        factory_address: Some(factory_address.to_string()),
        logo: Some(format!("https://img.example/{}.png", chain_uid)),
    }
}

pub fn token_record(
    token_id: &str,
    display_name: &str,
    price: Option<&str>,
    decimals: Option<u32>,
) -> TokenMetadataRecord {
    TokenMetadataRecord {
        token_id: token_id.to_string(),
        display_name: Some(display_name.to_string()),
        image: None,
        price: price.map(str::to_string),
        coin_decimal: decimals,
    }
}
