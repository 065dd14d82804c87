use rust_decimal::Decimal;
use std::str::FromStr;

use crate::{
    constants::DEFAULT_TOKEN_DECIMALS,
    models::{ChainResult, EnrichedBalance, RawBalanceEntry},
    services::{
        balance_fetcher::{ChainFetch, ChainOutcome},
        token_metadata::TokenMetadataIndex,
    },
};

// rust_decimal carries at most 28 significant digits.
const MAX_SIGNIFICANT_DIGITS: usize = 28;

/// Converts an integer amount in smallest units into human scale.
///
/// The decimal point is placed textually so that no precision is lost for
/// amounts that fit; fractional digits beyond the representable precision are
/// truncated. Returns `None` for non-integer input or integer parts that do not fit.
pub fn adjusted_amount(raw_amount: &str, decimals: u32) -> Option<Decimal> {
    let digits = raw_amount.trim();
    let digits = digits.strip_prefix('+').unwrap_or(digits);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(Decimal::ZERO);
    }

    let decimals = decimals as usize;
    // Every significant digit would land past the representable scale.
    if decimals >= digits.len() + MAX_SIGNIFICANT_DIGITS {
        return Some(Decimal::ZERO);
    }

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        let mut frac = "0".repeat(decimals - digits.len());
        frac.push_str(digits);
        ("0".to_string(), frac)
    };

    let int_digits = int_part.trim_start_matches('0').len();
    if int_digits > MAX_SIGNIFICANT_DIGITS {
        return None;
    }

    let frac = frac_part.trim_end_matches('0');
    let frac_budget = MAX_SIGNIFICANT_DIGITS.saturating_sub(int_digits.max(1));
    let frac = &frac[..frac.len().min(frac_budget)];

    let text = if frac.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac)
    };
    Decimal::from_str(&text).ok()
}

pub fn parse_price(price: Option<&str>) -> Option<Decimal> {
    price.and_then(|p| {
        let p = p.trim();
        Decimal::from_str(p)
            .or_else(|_| Decimal::from_scientific(p))
            .ok()
    })
}

/// Joins a chain's raw balances with token metadata and prices them.
pub fn enrich_balance(entry: RawBalanceEntry, index: &TokenMetadataIndex) -> EnrichedBalance {
    let metadata = index.get(&entry.token_id);
    if metadata.is_none() {
        tracing::warn!("No metadata for token {}; returning it unenriched", entry.token_id);
    }

    let decimals = metadata.and_then(|m| m.coin_decimal);
    let adjusted = adjusted_amount(&entry.amount, decimals.unwrap_or(DEFAULT_TOKEN_DECIMALS))
        .unwrap_or_else(|| {
            tracing::warn!(
                "Unparseable amount {:?} for token {}; treating as zero",
                entry.amount,
                entry.token_id
            );
            Decimal::ZERO
        });

    let price = metadata.and_then(|m| m.price.clone());
    let value = match parse_price(price.as_deref()) {
        Some(p) => adjusted.checked_mul(p).unwrap_or_else(|| {
            tracing::warn!(
                "Value of {} {} at price {} overflowed; treating as zero",
                adjusted,
                entry.token_id,
                p
            );
            Decimal::ZERO
        }),
        None => Decimal::ZERO,
    };

    EnrichedBalance {
        display_name: metadata.and_then(|m| m.display_name.clone()),
        image: metadata.and_then(|m| m.image.clone()),
        price,
        decimals,
        adjusted_amount: adjusted,
        value,
        token_id: entry.token_id,
        amount: entry.amount,
    }
}

pub fn enrich_chain(fetch: ChainFetch, index: &TokenMetadataIndex) -> ChainResult {
    let ChainFetch { chain, outcome } = fetch;
    match outcome {
        ChainOutcome::Failed(error) => ChainResult::failed(&chain, error),
        ChainOutcome::Balances { balances, raw } => {
            let raw_error_check = if balances.is_empty() {
                tracing::debug!("Chain {} returned no balances: {}", chain.chain_uid, raw);
                Some(raw)
            } else {
                None
            };

            let mut result = ChainResult {
                display_name: chain.display_name,
                chain_uid: chain.chain_uid,
                chain_img: chain.chain_img,
                balances: balances
                    .into_iter()
                    .map(|entry| enrich_balance(entry, index))
                    .collect(),
                total_value: Decimal::ZERO,
                error: None,
                raw_error_check,
            };
            result.refresh_total_value();
            result
        }
    }
}

pub fn enrich_all(fetches: Vec<ChainFetch>, index: &TokenMetadataIndex) -> Vec<ChainResult> {
    fetches
        .into_iter()
        .map(|fetch| enrich_chain(fetch, index))
        .collect()
}
