//! Gas adjustment and fee arithmetic.
//!
//! All arithmetic is exact: factors are converted to rationals from their
//! decimal representation, multiplied, and rounded up.

use crate::types::{decimal_to_rational, Coin, DecCoin};
use num::{BigInt, BigRational, ToPrimitive};

/// Multiplies `a` by `f` and rounds up to the nearest integer.
///
/// `f` is interpreted through its shortest decimal representation, so
/// `mul_ceil(100, 1.1)` is exactly 110. Non-finite or negative factors
/// yield zero.
pub fn mul_ceil(a: u64, f: f64) -> BigInt {
    if !f.is_finite() || f <= 0.0 {
        return BigInt::from(0u8);
    }
    let factor = decimal_to_rational(&f.to_string())
        .or_else(|| BigRational::from_float(f))
        .unwrap_or_else(|| BigRational::from_integer(BigInt::from(0u8)));
    (factor * BigInt::from(a)).ceil().to_integer()
}

/// Applies the gas adjustment to a simulated gas amount, saturating at
/// `u64::MAX`.
pub fn adjust_gas(gas_used: u64, adjustment: f64) -> u64 {
    mul_ceil(gas_used, adjustment).to_u64().unwrap_or(u64::MAX)
}

/// Computes the fee for `gas_limit` at the given prices, one coin per
/// price, rounding each amount up. Zero amounts are omitted.
pub fn fees_from_gas_prices(gas_prices: &[DecCoin], gas_limit: u64) -> Vec<Coin> {
    let gas = BigRational::from_integer(BigInt::from(gas_limit));
    gas_prices
        .iter()
        .filter_map(|price| {
            let amount = (price.to_rational() * &gas).ceil().to_integer();
            let amount = amount.to_u128().unwrap_or(u128::MAX);
            (amount > 0).then(|| Coin {
                denom: price.denom.clone(),
                amount,
            })
        })
        .collect()
}
