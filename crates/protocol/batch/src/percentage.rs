//! Effective gas price percentage.

use crate::BatchCodecError;
use alloy_primitives::U256;

/// Percentage byte meaning the transaction paid its full nominal gas price.
pub const MAX_EFFECTIVE_PERCENTAGE: u8 = u8::MAX;

/// Computes the byte relating a transaction's nominal `gas_price` to the price it was charged.
///
/// The result is `ceil(effective_gas_price * 256 / gas_price) - 1`, saturating at
/// [`MAX_EFFECTIVE_PERCENTAGE`] when the effective price is not below the nominal one.
pub fn effective_gas_price_percentage(
    gas_price: u128,
    effective_gas_price: u128,
) -> Result<u8, BatchCodecError> {
    if gas_price == 0 || effective_gas_price == 0 {
        return Err(BatchCodecError::EffectivePercentageEmpty);
    }
    if gas_price <= effective_gas_price {
        return Ok(MAX_EFFECTIVE_PERCENTAGE);
    }

    let gas_price = U256::from(gas_price);
    let numerator = U256::from(effective_gas_price) * U256::from(256) + gas_price - U256::from(1);
    let percentage = numerator / gas_price - U256::from(1);
    // effective < gas_price bounds the quotient to at most 255.
    Ok(percentage.saturating_to::<u8>())
}
