// Utility helpers

use crate::{
    constants::{EVM_ADDRESS_HEX_LEN, EVM_ADDRESS_PREFIX},
    error::{AppError, Result},
};

/// Strict EVM wallet address guard: `0x` followed by exactly 40 hex characters.
pub fn validate_evm_address(raw: &str) -> Result<String> {
    let address = raw.trim();
    if address.is_empty() {
        return Err(AppError::InvalidAddress("address is required".to_string()));
    }

    let body = address
        .strip_prefix(EVM_ADDRESS_PREFIX)
        .ok_or_else(|| AppError::InvalidAddress(format!("{} must start with 0x", address)))?;

    if body.len() != EVM_ADDRESS_HEX_LEN {
        return Err(AppError::InvalidAddress(format!(
            "{} must have {} hex characters after 0x",
            address, EVM_ADDRESS_HEX_LEN
        )));
    }
    hex::decode(body)
        .map_err(|e| AppError::InvalidAddress(format!("{} is not hex: {}", address, e)))?;

    Ok(address.to_string())
}

/// Heuristic used by the chain directory: EVM factories are deployed at `0x` addresses.
pub fn is_evm_factory(factory_address: &str) -> bool {
    factory_address.starts_with(EVM_ADDRESS_PREFIX)
}

/// Treats blank strings from upstream the same as missing values.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
