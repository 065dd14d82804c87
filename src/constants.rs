/// Application constants

// Upstream gateway
pub const DEFAULT_GRAPHQL_URL: &str = "https://testnet.api.euclidprotocol.com/graphql";
pub const DEFAULT_HUB_CHAIN_UID: &str = "neuron";

// EVM classification
pub const EVM_ADDRESS_PREFIX: &str = "0x";
pub const EVM_ADDRESS_HEX_LEN: usize = 40;

// Balance lookups
pub const DEFAULT_BALANCE_PAGE_LIMIT: u32 = 10;
pub const BALANCE_PAGE_SKIP: u32 = 0;
pub const DEFAULT_TOKEN_DECIMALS: u32 = 18;

// Filters
pub const CHAIN_FILTER_ALL: &str = "all";

// Caching
pub const DEFAULT_BALANCE_CACHE_TTL_SECS: u64 = 60;
pub const DEFAULT_CHAIN_LIST_MAX_AGE_SECS: u64 = 3600;
pub const CACHE_SWEEP_INTERVAL_SECS: u64 = 30;
