use std::sync::Arc;

use crate::{
    error::{AppError, Result},
    integrations::EuclidGateway,
    utils::non_blank,
};

/// Resolves the protocol's virtual balance contract, the multicall target for
/// every per-chain balance query.
#[derive(Clone)]
pub struct RouterStateResolver {
    gateway: Arc<dyn EuclidGateway>,
}

impl RouterStateResolver {
    pub fn new(gateway: Arc<dyn EuclidGateway>) -> Self {
        Self { gateway }
    }

    pub async fn virtual_balance_address(&self) -> Result<String> {
        let state = self.gateway.router_state().await?;
        let address = non_blank(state.virtual_balance_address.as_deref())
            .ok_or_else(|| {
                AppError::Upstream("Router state has no virtual balance address".to_string())
            })?
            .to_string();

        tracing::info!("Router virtual balance address: {}", address);
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::FakeGateway;

    #[tokio::test]
    async fn returns_trimmed_address() {
        let gateway = FakeGateway::default().with_router(Some(" nibi1vbalance "));
        let resolver = RouterStateResolver::new(Arc::new(gateway));
        assert_eq!(resolver.virtual_balance_address().await.unwrap(), "nibi1vbalance");
    }

    #[tokio::test]
    async fn missing_address_is_fatal() {
        let gateway = FakeGateway::default().with_router(None);
        let resolver = RouterStateResolver::new(Arc::new(gateway));
        let err = resolver.virtual_balance_address().await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn upstream_failure_propagates() {
        let gateway = FakeGateway::default().failing_router("router offline");
        let resolver = RouterStateResolver::new(Arc::new(gateway));
        assert!(resolver.virtual_balance_address().await.is_err());
    }
}
