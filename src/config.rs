use serde::Deserialize;
use std::env;

use crate::constants::{
    DEFAULT_BALANCE_CACHE_TTL_SECS, DEFAULT_BALANCE_PAGE_LIMIT, DEFAULT_CHAIN_LIST_MAX_AGE_SECS,
    DEFAULT_GRAPHQL_URL, DEFAULT_HUB_CHAIN_UID,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Upstream gateway
    pub graphql_url: String,
    pub hub_chain_uid: String,
    pub upstream_timeout_secs: u64,
    pub upstream_connect_timeout_secs: u64,

    // Balance lookups
    pub balance_page_limit: u32,
    pub balance_cache_ttl_secs: u64,

    // HTTP caching
    pub chain_list_max_age_secs: u64,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            graphql_url: env::var("EUCLID_GRAPHQL_URL")
                .unwrap_or_else(|_| DEFAULT_GRAPHQL_URL.to_string()),
            hub_chain_uid: env::var("EUCLID_HUB_CHAIN_UID")
                .unwrap_or_else(|_| DEFAULT_HUB_CHAIN_UID.to_string()),
            upstream_timeout_secs: env::var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or_else(|_| "12".to_string())
                .parse()?,
            upstream_connect_timeout_secs: env::var("UPSTREAM_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "4".to_string())
                .parse()?,

            balance_page_limit: env::var("BALANCE_PAGE_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BALANCE_PAGE_LIMIT),
            balance_cache_ttl_secs: env::var("BALANCE_CACHE_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BALANCE_CACHE_TTL_SECS),

            chain_list_max_age_secs: env::var("CHAIN_LIST_MAX_AGE_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CHAIN_LIST_MAX_AGE_SECS),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.graphql_url.trim().is_empty() {
            anyhow::bail!("EUCLID_GRAPHQL_URL is empty");
        }
        if url::Url::parse(self.graphql_url.trim()).is_err() {
            anyhow::bail!("EUCLID_GRAPHQL_URL is not a valid URL: {}", self.graphql_url);
        }
        if self.hub_chain_uid.trim().is_empty() {
            anyhow::bail!("EUCLID_HUB_CHAIN_UID is empty");
        }
        if self.balance_page_limit == 0 {
            anyhow::bail!("BALANCE_PAGE_LIMIT must be > 0");
        }
        if self.upstream_timeout_secs == 0 {
            anyhow::bail!("UPSTREAM_TIMEOUT_SECS must be > 0");
        }

        if self.balance_cache_ttl_secs == 0 {
            tracing::warn!("BALANCE_CACHE_TTL_SECS is 0; balance response cache disabled");
        }
        if self.graphql_url.contains("testnet") && !self.is_testnet() {
            tracing::warn!("Non-development environment pointed at a testnet gateway");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_testnet(&self) -> bool {
        self.environment == "development" || self.environment == "testnet"
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        environment: "development".to_string(),
        graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
        hub_chain_uid: DEFAULT_HUB_CHAIN_UID.to_string(),
        upstream_timeout_secs: 12,
        upstream_connect_timeout_secs: 4,
        balance_page_limit: DEFAULT_BALANCE_PAGE_LIMIT,
        balance_cache_ttl_secs: DEFAULT_BALANCE_CACHE_TTL_SECS,
        chain_list_max_age_secs: DEFAULT_CHAIN_LIST_MAX_AGE_SECS,
        cors_allowed_origins: "*".to_string(),
    }
}
