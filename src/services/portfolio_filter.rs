use std::cmp::Ordering;
use std::str::FromStr;

use crate::{
    constants::CHAIN_FILTER_ALL,
    error::AppError,
    models::{Chain, ChainResult, EnrichedBalance},
};

// ==================== CHAIN FILTER ====================

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ChainFilter {
    #[default]
    All,
    Exact(String),
}

impl ChainFilter {
    /// Missing, blank and `all` all mean no filtering.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => ChainFilter::All,
            Some(value) if value == CHAIN_FILTER_ALL => ChainFilter::All,
            Some(value) => ChainFilter::Exact(value.to_string()),
        }
    }

    pub fn matches(&self, chain: &Chain) -> bool {
        match self {
            ChainFilter::All => true,
            ChainFilter::Exact(value) => chain.display_name == *value || chain.chain_uid == *value,
        }
    }

    pub fn as_key(&self) -> &str {
        match self {
            ChainFilter::All => CHAIN_FILTER_ALL,
            ChainFilter::Exact(value) => value,
        }
    }
}

// ==================== SORT ====================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Descending total USD value.
    #[default]
    Highest,
    /// Chain display name.
    Alphabetical,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Highest => "highest",
            SortOrder::Alphabetical => "alphabetical",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "highest" => Ok(SortOrder::Highest),
            "alphabetical" => Ok(SortOrder::Alphabetical),
            other => Err(AppError::BadRequest(format!(
                "Unknown sort order '{}'; expected 'highest' or 'alphabetical'",
                other
            ))),
        }
    }
}

// Case-insensitive first so "arbitrum" sorts next to "Arbitrum"; exact order breaks ties.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

pub fn sort_chains(chains: &mut [ChainResult], order: SortOrder) {
    match order {
        SortOrder::Alphabetical => {
            chains.sort_by(|a, b| compare_names(&a.display_name, &b.display_name))
        }
        SortOrder::Highest => chains.sort_by(|a, b| b.total_value.cmp(&a.total_value)),
    }
}

// ==================== SEARCH ====================

fn token_matches(token: &EnrichedBalance, needle: &str) -> bool {
    token.token_id.to_lowercase().contains(needle)
        || token
            .display_name
            .as_deref()
            .map(|name| name.to_lowercase().contains(needle))
            .unwrap_or(false)
}

/// Case-insensitive search over chain names and tokens.
///
/// A chain whose name matches keeps all of its tokens. Any other chain keeps
/// only its matching tokens and disappears when none match.
pub fn apply_search(chains: Vec<ChainResult>, query: &str) -> Vec<ChainResult> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return chains;
    }

    chains
        .into_iter()
        .filter_map(|mut chain| {
            if chain.display_name.to_lowercase().contains(&needle) {
                return Some(chain);
            }
            chain.balances.retain(|token| token_matches(token, &needle));
            if chain.balances.is_empty() {
                return None;
            }
            chain.refresh_total_value();
            Some(chain)
        })
        .collect()
}

// ==================== VIEW ====================

/// Everything that shapes a balances payload besides the wallet address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PortfolioView {
    pub chain: ChainFilter,
    pub search: Option<String>,
    pub sort: SortOrder,
}

impl PortfolioView {
    pub fn new(chain: Option<&str>, search: Option<&str>, sort: Option<&str>) -> Result<Self, AppError> {
        let sort = match sort.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse()?,
            None => SortOrder::default(),
        };
        let search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            chain: ChainFilter::parse(chain),
            search,
            sort,
        })
    }

    /// Search and sort; the chain filter is applied earlier, before balances are fetched.
    pub fn apply(&self, chains: Vec<ChainResult>) -> Vec<ChainResult> {
        let mut chains = match self.search.as_deref() {
            Some(query) => apply_search(chains, query),
            None => chains,
        };
        sort_chains(&mut chains, self.sort);
        chains
    }
}
