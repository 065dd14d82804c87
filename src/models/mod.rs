// src/models/mod.rs
pub mod portfolio;

pub use portfolio::{Chain, ChainResult, EnrichedBalance, RawBalanceEntry, TokenMetadata};
