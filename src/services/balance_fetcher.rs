use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    constants::BALANCE_PAGE_SKIP,
    error::Result,
    integrations::{
        euclid::{
            CrossChainUser, GetUserBalances, Pagination, SmartQuery, SmartQueryMsg,
            SmartQueryResult,
        },
        EuclidGateway,
    },
    models::{Chain, RawBalanceEntry},
    utils::validate_evm_address,
};

/// A balance query paired with the chain it was built for. Results are matched
/// back through this pairing, never through a bare index lookup.
#[derive(Debug, Clone)]
pub struct TaggedQuery {
    pub chain: Chain,
    pub query: SmartQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    Balances {
        balances: Vec<RawBalanceEntry>,
        /// Decoded upstream payload, kept for diagnostics.
        raw: Value,
    },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ChainFetch {
    pub chain: Chain,
    pub outcome: ChainOutcome,
}

#[derive(Debug, Deserialize)]
struct BalancePage {
    #[serde(default)]
    balances: Vec<RawBalanceEntry>,
    #[serde(default)]
    user: Option<CrossChainUser>,
}

#[derive(Clone)]
pub struct BalanceFetcher {
    gateway: Arc<dyn EuclidGateway>,
    hub_chain_uid: String,
    page_limit: u32,
}

impl BalanceFetcher {
    pub fn new(gateway: Arc<dyn EuclidGateway>, hub_chain_uid: String, page_limit: u32) -> Self {
        Self {
            gateway,
            hub_chain_uid,
            page_limit,
        }
    }

    pub fn build_queries(
        &self,
        address: &str,
        chains: &[Chain],
        virtual_balance_address: &str,
    ) -> Vec<TaggedQuery> {
        chains
            .iter()
            .map(|chain| TaggedQuery {
                chain: chain.clone(),
                query: SmartQuery {
                    contract_address: virtual_balance_address.to_string(),
                    msg: SmartQueryMsg {
                        get_user_balances: GetUserBalances {
                            user: CrossChainUser {
                                chain_uid: chain.chain_uid.clone(),
                                address: address.to_string(),
                            },
                            pagination: Pagination {
                                skip: BALANCE_PAGE_SKIP,
                                limit: self.page_limit,
                            },
                        },
                    },
                },
            })
            .collect()
    }

    /// Fetches balances for every chain through one multicall on the hub chain.
    ///
    /// The output keeps the input chain order. A failure of one chain's sub-query
    /// only marks that chain as failed. If the batched call itself fails, each
    /// chain is queried once on its own, concurrently, and every chain settles
    /// independently.
    pub async fn fetch(
        &self,
        address: &str,
        chains: Vec<Chain>,
        virtual_balance_address: &str,
    ) -> Result<Vec<ChainFetch>> {
        let address = validate_evm_address(address)?;
        if chains.is_empty() {
            tracing::debug!("No chains selected; skipping multicall");
            return Ok(Vec::new());
        }

        let tagged = self.build_queries(&address, &chains, virtual_balance_address);
        let queries: Vec<SmartQuery> = tagged.iter().map(|t| t.query.clone()).collect();

        tracing::info!(
            "Submitting multicall with {} balance queries on {}",
            queries.len(),
            self.hub_chain_uid
        );

        match self.gateway.smart_queries(&self.hub_chain_uid, &queries).await {
            Ok(results) => Ok(pair_results(tagged, results)),
            Err(err) => {
                tracing::warn!(
                    "Batched multicall failed ({}); querying {} chains individually",
                    err,
                    tagged.len()
                );
                Ok(self.fetch_individually(tagged).await)
            }
        }
    }

    async fn fetch_individually(&self, tagged: Vec<TaggedQuery>) -> Vec<ChainFetch> {
        let futures = tagged.into_iter().map(|tagged| async move {
            let outcome = match self
                .gateway
                .smart_queries(&self.hub_chain_uid, std::slice::from_ref(&tagged.query))
                .await
            {
                Ok(mut results) if results.len() == 1 => {
                    outcome_from_result(&tagged, results.remove(0))
                }
                Ok(results) => ChainOutcome::Failed(format!(
                    "multicall returned {} results for 1 query",
                    results.len()
                )),
                Err(err) => ChainOutcome::Failed(err.to_string()),
            };
            log_failure(&tagged.chain, &outcome);
            ChainFetch {
                chain: tagged.chain,
                outcome,
            }
        });

        futures_util::future::join_all(futures).await
    }
}

pub fn pair_results(tagged: Vec<TaggedQuery>, results: Vec<SmartQueryResult>) -> Vec<ChainFetch> {
    if results.len() != tagged.len() {
        let message = format!(
            "multicall returned {} results for {} queries",
            results.len(),
            tagged.len()
        );
        tracing::warn!("{}; refusing to pair results with chains", message);
        return tagged
            .into_iter()
            .map(|t| ChainFetch {
                chain: t.chain,
                outcome: ChainOutcome::Failed(message.clone()),
            })
            .collect();
    }

    tagged
        .into_iter()
        .zip(results)
        .map(|(tagged, result)| {
            let outcome = outcome_from_result(&tagged, result);
            log_failure(&tagged.chain, &outcome);
            ChainFetch {
                chain: tagged.chain,
                outcome,
            }
        })
        .collect()
}

fn outcome_from_result(tagged: &TaggedQuery, result: SmartQueryResult) -> ChainOutcome {
    if let Some(error) = result.error.filter(|e| !e.trim().is_empty()) {
        return ChainOutcome::Failed(error);
    }
    let Some(success) = result.success else {
        return ChainOutcome::Failed("multicall returned neither success nor error".to_string());
    };

    let payload = match decode_success(success) {
        Ok(payload) => payload,
        Err(message) => return ChainOutcome::Failed(message),
    };

    let page: BalancePage = match serde_json::from_value(payload.clone()) {
        Ok(page) => page,
        Err(e) => return ChainOutcome::Failed(format!("unexpected balance payload: {}", e)),
    };

    // Payloads that echo their user must belong to the chain this query was built for.
    if let Some(user) = page.user {
        if user.chain_uid != tagged.chain.chain_uid {
            return ChainOutcome::Failed(format!(
                "result for chain {} paired with query for {}",
                user.chain_uid, tagged.chain.chain_uid
            ));
        }
    }

    ChainOutcome::Balances {
        balances: page.balances,
        raw: payload,
    }
}

// Some gateway deployments return the contract response as base64-encoded JSON.
fn decode_success(success: Value) -> std::result::Result<Value, String> {
    match success {
        Value::String(encoded) => {
            let bytes = STANDARD
                .decode(encoded.trim())
                .map_err(|e| format!("success payload is neither JSON nor base64: {}", e))?;
            serde_json::from_slice(&bytes)
                .map_err(|e| format!("base64 success payload is not JSON: {}", e))
        }
        other => Ok(other),
    }
}

fn log_failure(chain: &Chain, outcome: &ChainOutcome) {
    if let ChainOutcome::Failed(message) = outcome {
        tracing::warn!("Balance lookup failed for {}: {}", chain.chain_uid, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, services::testing::{evm_chain, FakeGateway}};
    use serde_json::json;

    const WALLET: &str = "0x887e4aac216674d2c432798f851c1ea5d505b2e1";

    fn fetcher(gateway: &FakeGateway) -> BalanceFetcher {
        BalanceFetcher::new(Arc::new(gateway.clone()), "neuron".to_string(), 10)
    }

    fn balances_of(fetch: &ChainFetch) -> &[RawBalanceEntry] {
        match &fetch.outcome {
            ChainOutcome::Balances { balances, .. } => balances,
            ChainOutcome::Failed(msg) => panic!("chain {} failed: {msg}", fetch.chain.chain_uid),
        }
    }

    #[test]
    fn build_queries_targets_virtual_balance_contract() {
        let gateway = FakeGateway::default();
        let chains = vec![evm_chain("amoy", "Amoy"), evm_chain("sepolia", "Sepolia")];
        let tagged = fetcher(&gateway).build_queries(WALLET, &chains, "nibi1vbalance");

        assert_eq!(tagged.len(), 2);
        for (tag, chain) in tagged.iter().zip(&chains) {
            assert_eq!(tag.chain, *chain);
            assert_eq!(tag.query.contract_address, "nibi1vbalance");
            let msg = &tag.query.msg.get_user_balances;
            assert_eq!(msg.user.chain_uid, chain.chain_uid);
            assert_eq!(msg.user.address, WALLET);
            assert_eq!(msg.pagination, Pagination { skip: 0, limit: 10 });
        }
    }

    #[tokio::test]
    async fn invalid_address_fails_before_network() {
        let gateway = FakeGateway::default();
        let err = fetcher(&gateway)
            .fetch("0x1234", vec![evm_chain("amoy", "Amoy")], "nibi1vbalance")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidAddress(_)));
        assert_eq!(gateway.multicall_count(), 0);
    }

    #[tokio::test]
    async fn empty_chain_list_skips_multicall() {
        let gateway = FakeGateway::default();
        let result = fetcher(&gateway).fetch(WALLET, Vec::new(), "nibi1vbalance").await.unwrap();
        assert!(result.is_empty());
        assert_eq!(gateway.multicall_count(), 0);
    }

    #[tokio::test]
    async fn single_batch_on_hub_chain_preserves_order() {
        let gateway = FakeGateway::default()
            .with_balances("amoy", json!({ "balances": [{ "token_id": "usdc", "amount": "5" }] }))
            .with_balances("sepolia", json!({ "balances": [{ "token_id": "eth", "amount": "7" }] }));
        let chains = vec![evm_chain("sepolia", "Sepolia"), evm_chain("amoy", "Amoy")];

        let result = fetcher(&gateway).fetch(WALLET, chains, "nibi1vbalance").await.unwrap();

        assert_eq!(gateway.multicall_count(), 1);
        assert_eq!(gateway.multicall_calls()[0], ("neuron".to_string(), 2));
        assert_eq!(result[0].chain.chain_uid, "sepolia");
        assert_eq!(balances_of(&result[0])[0].token_id, "eth");
        assert_eq!(result[1].chain.chain_uid, "amoy");
        assert_eq!(balances_of(&result[1])[0].token_id, "usdc");
    }

    #[tokio::test]
    async fn per_chain_error_is_isolated() {
        let gateway = FakeGateway::default()
            .with_balances("amoy", json!({ "balances": [{ "token_id": "usdc", "amount": "5" }] }))
            .with_chain_error("sepolia", "contract query failed");
        let chains = vec![evm_chain("amoy", "Amoy"), evm_chain("sepolia", "Sepolia")];

        let result = fetcher(&gateway).fetch(WALLET, chains, "nibi1vbalance").await.unwrap();

        assert_eq!(balances_of(&result[0]).len(), 1);
        assert_eq!(
            result[1].outcome,
            ChainOutcome::Failed("contract query failed".to_string())
        );
    }

    #[tokio::test]
    async fn batch_failure_falls_back_to_individual_queries() {
        let gateway = FakeGateway::default()
            .failing_batch("gateway timeout")
            .with_balances("amoy", json!({ "balances": [{ "token_id": "usdc", "amount": "5" }] }))
            .with_chain_transport_failure("sepolia", "connection reset");
        let chains = vec![evm_chain("amoy", "Amoy"), evm_chain("sepolia", "Sepolia")];

        let result = fetcher(&gateway).fetch(WALLET, chains, "nibi1vbalance").await.unwrap();

        // one failed batch + one query per chain
        assert_eq!(gateway.multicall_count(), 3);
        assert_eq!(result[0].chain.chain_uid, "amoy");
        assert_eq!(balances_of(&result[0]).len(), 1);
        match &result[1].outcome {
            ChainOutcome::Failed(msg) => assert!(msg.contains("connection reset")),
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn count_mismatch_fails_every_chain() {
        let gateway = FakeGateway::default();
        let chains = vec![evm_chain("amoy", "Amoy"), evm_chain("sepolia", "Sepolia")];
        let tagged = fetcher(&gateway).build_queries(WALLET, &chains, "nibi1vbalance");
        let results = vec![SmartQueryResult {
            success: Some(json!({ "balances": [] })),
            error: None,
        }];

        let paired = pair_results(tagged, results);
        assert_eq!(paired.len(), 2);
        assert!(paired
            .iter()
            .all(|p| matches!(p.outcome, ChainOutcome::Failed(_))));
    }

    #[test]
    fn echoed_user_on_wrong_chain_is_rejected() {
        let gateway = FakeGateway::default();
        let chains = vec![evm_chain("amoy", "Amoy")];
        let tagged = fetcher(&gateway).build_queries(WALLET, &chains, "nibi1vbalance");
        let results = vec![SmartQueryResult {
            success: Some(json!({
                "user": { "chain_uid": "sepolia", "address": WALLET },
                "balances": []
            })),
            error: None,
        }];

        let paired = pair_results(tagged, results);
        assert!(matches!(paired[0].outcome, ChainOutcome::Failed(_)));
    }

    #[test]
    fn base64_success_payload_is_decoded() {
        let gateway = FakeGateway::default();
        let chains = vec![evm_chain("amoy", "Amoy")];
        let tagged = fetcher(&gateway).build_queries(WALLET, &chains, "nibi1vbalance");
        let encoded = STANDARD.encode(r#"{"balances":[{"token_id":"usdc","amount":"42"}]}"#);
        let results = vec![SmartQueryResult {
            success: Some(Value::String(encoded)),
            error: None,
        }];

        let paired = pair_results(tagged, results);
        assert_eq!(balances_of(&paired[0])[0].amount, "42");
    }

    #[test]
    fn garbage_string_payload_is_a_chain_error() {
        let gateway = FakeGateway::default();
        let chains = vec![evm_chain("amoy", "Amoy")];
        let tagged = fetcher(&gateway).build_queries(WALLET, &chains, "nibi1vbalance");
        let results = vec![SmartQueryResult {
            success: Some(Value::String("%%%".to_string())),
            error: None,
        }];

        let paired = pair_results(tagged, results);
        assert!(matches!(paired[0].outcome, ChainOutcome::Failed(_)));
    }

    #[test]
    fn missing_balances_key_yields_empty_list() {
        let gateway = FakeGateway::default();
        let chains = vec![evm_chain("amoy", "Amoy")];
        let tagged = fetcher(&gateway).build_queries(WALLET, &chains, "nibi1vbalance");
        let results = vec![SmartQueryResult {
            success: Some(json!({ "total": 0 })),
            error: None,
        }];

        let paired = pair_results(tagged, results);
        match &paired[0].outcome {
            ChainOutcome::Balances { balances, raw } => {
                assert!(balances.is_empty());
                assert_eq!(raw, &json!({ "total": 0 }));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
