use crate::{error::Result, integrations::graphql::GraphQlClient};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ==================== OPERATIONS ====================

pub const ALL_CHAINS_QUERY: &str = r#"
query AllChains {
  chains {
    all_chains {
      chain_uid
      display_name
      factory_address
      logo
    }
  }
}
"#;

pub const ROUTER_STATE_QUERY: &str = r#"
query RouterState {
  router {
    state {
      virtual_balance_address
    }
  }
}
"#;

pub const TOKEN_METADATAS_QUERY: &str = r#"
query TokenMetadatas {
  token {
    token_metadatas {
      tokenId
      displayName
      image
      price
      coinDecimal
    }
  }
}
"#;

pub const SMART_QUERIES_QUERY: &str = r#"
query SmartQueries($chain_uid: String!, $queries: [SmartQueryInput!]!) {
  cw_multicall(chain_uid: $chain_uid) {
    smart_queries(queries: $queries) {
      results {
        success
        error
      }
    }
  }
}
"#;

// ==================== WIRE TYPES ====================

#[derive(Debug, Clone, Deserialize)]
pub struct ChainRecord {
    pub chain_uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub factory_address: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouterState {
    #[serde(default)]
    pub virtual_balance_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenMetadataRecord {
    #[serde(rename = "tokenId")]
    pub token_id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(rename = "coinDecimal", default, deserialize_with = "lenient_u32")]
    pub coin_decimal: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainUser {
    pub chain_uid: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub skip: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetUserBalances {
    pub user: CrossChainUser,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartQueryMsg {
    pub get_user_balances: GetUserBalances,
}

/// One contract query inside a `cw_multicall` batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmartQuery {
    pub contract_address: String,
    pub msg: SmartQueryMsg,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmartQueryResult {
    #[serde(default)]
    pub success: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AllChainsData {
    chains: AllChainsNode,
}

#[derive(Debug, Deserialize)]
struct AllChainsNode {
    all_chains: Vec<ChainRecord>,
}

#[derive(Debug, Deserialize)]
struct RouterData {
    router: RouterNode,
}

#[derive(Debug, Deserialize)]
struct RouterNode {
    state: RouterState,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    token: TokenNode,
}

#[derive(Debug, Deserialize)]
struct TokenNode {
    token_metadatas: Vec<TokenMetadataRecord>,
}

#[derive(Debug, Serialize)]
struct SmartQueriesVariables<'a> {
    chain_uid: &'a str,
    queries: &'a [SmartQuery],
}

#[derive(Debug, Deserialize)]
struct SmartQueriesData {
    cw_multicall: MulticallNode,
}

#[derive(Debug, Deserialize)]
struct MulticallNode {
    smart_queries: SmartQueriesNode,
}

#[derive(Debug, Deserialize)]
struct SmartQueriesNode {
    #[serde(default)]
    results: Vec<SmartQueryResult>,
}

// Prices and decimals are published as strings on some deployments and numbers on others.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

// ==================== GATEWAY TRAIT ====================

/// The four upstream operations the portfolio pipeline consumes.
#[async_trait::async_trait]
pub trait EuclidGateway: Send + Sync {
    async fn all_chains(&self) -> Result<Vec<ChainRecord>>;

    async fn router_state(&self) -> Result<RouterState>;

    async fn token_metadatas(&self) -> Result<Vec<TokenMetadataRecord>>;

    /// Runs every query as one `cw_multicall` batch executed on `chain_uid`.
    async fn smart_queries(
        &self,
        chain_uid: &str,
        queries: &[SmartQuery],
    ) -> Result<Vec<SmartQueryResult>>;

    fn endpoint(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct EuclidClient {
    graphql: GraphQlClient,
}

impl EuclidClient {
    pub fn new(graphql: GraphQlClient) -> Self {
        Self { graphql }
    }
}

#[async_trait::async_trait]
impl EuclidGateway for EuclidClient {
    async fn all_chains(&self) -> Result<Vec<ChainRecord>> {
        let data: AllChainsData = self
            .graphql
            .execute("AllChains", ALL_CHAINS_QUERY, serde_json::json!({}))
            .await?;
        Ok(data.chains.all_chains)
    }

    async fn router_state(&self) -> Result<RouterState> {
        let data: RouterData = self
            .graphql
            .execute("RouterState", ROUTER_STATE_QUERY, serde_json::json!({}))
            .await?;
        Ok(data.router.state)
    }

    async fn token_metadatas(&self) -> Result<Vec<TokenMetadataRecord>> {
        let data: TokenData = self
            .graphql
            .execute("TokenMetadatas", TOKEN_METADATAS_QUERY, serde_json::json!({}))
            .await?;
        Ok(data.token.token_metadatas)
    }

    async fn smart_queries(
        &self,
        chain_uid: &str,
        queries: &[SmartQuery],
    ) -> Result<Vec<SmartQueryResult>> {
        let variables = SmartQueriesVariables { chain_uid, queries };
        let data: SmartQueriesData = self
            .graphql
            .execute("SmartQueries", SMART_QUERIES_QUERY, variables)
            .await?;
        Ok(data.cw_multicall.smart_queries.results)
    }

    fn endpoint(&self) -> &str {
        self.graphql.endpoint()
    }
}
