// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Conversions between decimal token amounts and smallest units.

use alloy_primitives::utils::{format_units, parse_units};
use alloy_primitives::{Address, B256, U256};
use std::cmp::Ordering;

use crate::error::{BridgeError, Result};

/// Parses a user-supplied decimal amount into smallest token units.
///
/// The conversion is exact: digits beyond `decimals` are rejected rather than
/// rounded. Zero and negative amounts are input errors.
///
/// ```rust
/// use alloy_primitives::U256;
/// use xbridge_rs::parse_amount;
///
/// assert_eq!(parse_amount("1.5", 6).unwrap(), U256::from(1_500_000u64));
/// assert!(parse_amount("0", 18).is_err());
/// ```
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(BridgeError::InvalidInput("amount is empty".to_string()));
    }
    if amount.starts_with('-') {
        return Err(BridgeError::InvalidInput(format!(
            "amount must be positive, got {amount}"
        )));
    }

    if let Some((_, fraction)) = amount.split_once('.') {
        if fraction.len() > decimals as usize {
            return Err(BridgeError::InvalidInput(format!(
                "amount {amount} has more than {decimals} decimal places"
            )));
        }
    }

    let value = parse_units(amount, decimals)
        .map_err(|e| BridgeError::InvalidInput(format!("invalid amount {amount:?}: {e}")))?
        .get_absolute();
    if value.is_zero() {
        return Err(BridgeError::InvalidInput(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(value)
}

/// Renders smallest units as a decimal amount.
pub fn format_amount(value: U256, decimals: u8) -> Result<String> {
    Ok(format_units(value, decimals)?)
}

/// Converts `amount` between two local precisions of the same token.
///
/// Scaling down drops the digits the target precision cannot hold. Returns
/// `None` when scaling up overflows.
///
/// ```rust
/// use alloy_primitives::U256;
/// use xbridge_rs::rescale_amount;
///
/// let wei = U256::from(1_500_000_000_000_000_000u64);
/// assert_eq!(rescale_amount(wei, 18, 6), Some(U256::from(1_500_000u64)));
/// assert_eq!(rescale_amount(U256::from(1_500_000u64), 6, 18), Some(wei));
/// ```
pub fn rescale_amount(amount: U256, from_decimals: u8, to_decimals: u8) -> Option<U256> {
    match to_decimals.cmp(&from_decimals) {
        Ordering::Equal => Some(amount),
        Ordering::Less => Some(
            pow10(from_decimals - to_decimals).map_or(U256::ZERO, |divisor| amount / divisor),
        ),
        Ordering::Greater => amount.checked_mul(pow10(to_decimals - from_decimals)?),
    }
}

fn pow10(exponent: u8) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(exponent))
}

/// Left-pads an EVM address into the 32-byte form used by the messaging layer.
pub fn address_to_bytes32(address: Address) -> B256 {
    address.into_word()
}
