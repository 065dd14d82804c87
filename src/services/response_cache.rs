use axum::body::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::services::portfolio_filter::PortfolioView;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    address: String,
    view: PortfolioView,
}

impl CacheKey {
    /// EVM addresses are case-insensitive, so the key uses the lower-cased form.
    pub fn new(address: &str, view: &PortfolioView) -> Self {
        Self {
            address: address.trim().to_ascii_lowercase(),
            view: view.clone(),
        }
    }
}

#[derive(Clone)]
struct CacheEntry {
    payload: Bytes,
    expires_at: Instant,
}

/// Short-lived memo of serialized balance payloads.
///
/// Built once at startup and handed to the aggregator; entries expire after the
/// TTL and are dropped by [`ResponseCache::evict_expired`]. A zero TTL disables it.
#[derive(Clone)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Bytes> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.payload.clone())
    }

    pub async fn insert(&self, key: CacheKey, payload: Bytes) {
        if !self.is_enabled() {
            return;
        }
        let expires_at = Instant::now() + self.ttl;
        let mut entries = self.entries.write().await;
        entries.insert(key, CacheEntry { payload, expires_at });
    }

    pub async fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Periodically drops expired entries for the lifetime of the process.
    pub fn spawn_sweeper(self, interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let evicted = self.evict_expired().await;
                if evicted > 0 {
                    tracing::debug!("Response cache evicted {} expired entries", evicted);
                }
            }
        })
    }
}
