use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ==================== CHAIN ====================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    pub chain_uid: String,
    pub display_name: String,
    pub chain_img: Option<String>,
    pub factory_address: String,
}

// ==================== TOKEN METADATA ====================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenMetadata {
    pub token_id: String,
    pub display_name: Option<String>,
    pub image: Option<String>,
    /// USD price as a decimal string, exactly as published upstream.
    pub price: Option<String>,
    pub coin_decimal: Option<u32>,
}

// ==================== BALANCES ====================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBalanceEntry {
    pub token_id: String,
    /// Integer amount in the token's smallest unit.
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedBalance {
    pub token_id: String,
    pub amount: String,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u32>,
    #[serde(rename = "adjustedAmount")]
    pub adjusted_amount: Decimal,
    pub value: Decimal,
}

// ==================== CHAIN RESULT ====================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainResult {
    pub display_name: String,
    pub chain_uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_img: Option<String>,
    pub balances: Vec<EnrichedBalance>,
    pub total_value: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw upstream payload kept when a successful lookup carried no balances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_error_check: Option<Value>,
}

impl ChainResult {
    pub fn failed(chain: &Chain, error: String) -> Self {
        Self {
            display_name: chain.display_name.clone(),
            chain_uid: chain.chain_uid.clone(),
            chain_img: chain.chain_img.clone(),
            balances: Vec::new(),
            total_value: Decimal::ZERO,
            error: Some(error),
            raw_error_check: None,
        }
    }

    /// Sum of token values; tokens without a price contribute zero.
    /// Saturates at `Decimal::MAX` instead of overflowing.
    pub fn compute_total_value(&self) -> Decimal {
        let mut total = Decimal::ZERO;
        for balance in &self.balances {
            match total.checked_add(balance.value) {
                Some(sum) => total = sum,
                None => {
                    tracing::warn!(
                        "Total value for chain {} overflowed; saturating",
                        self.chain_uid
                    );
                    return Decimal::MAX;
                }
            }
        }
        total
    }

    pub fn refresh_total_value(&mut self) {
        self.total_value = self.compute_total_value();
    }
}
