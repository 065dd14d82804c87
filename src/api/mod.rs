// src/api/mod.rs

pub mod balances;
pub mod chains;
pub mod health;

use crate::config::Config;
use crate::services::PortfolioAggregator;

// AppState definition
#[derive(Clone)]
pub struct AppState {
    pub portfolio: PortfolioAggregator,
    pub config: Config,
}
