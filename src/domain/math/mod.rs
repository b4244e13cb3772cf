//! Constant-product math - quoting and share minting helpers
//!
//! All division floors toward zero; flooring always rounds in the pool's
//! favor. Multiplications are checked and surface `Overflow` instead of
//! panicking.

use crate::shared::errors::ExchangeError;
use crate::shared::types::PRICE_SCALE;

/// floor(a * b / d) with a checked intermediate product.
/// A zero divisor is a caller bug and surfaces as `Overflow` rather
/// than a panic.
pub fn mul_div(a: u128, b: u128, d: u128) -> Result<u128, ExchangeError> {
    let product = a.checked_mul(b).ok_or(ExchangeError::Overflow)?;
    product.checked_div(d).ok_or(ExchangeError::Overflow)
}

/// Constant-product quote for an exact input:
/// `floor(amount_in * reserve_out / (reserve_in + amount_in))`.
///
/// This is x*y=k solved for output given exact input; the floored result
/// keeps `(reserve_in + amount_in) * (reserve_out - amount_out)` at or
/// above `reserve_in * reserve_out`.
pub fn quote_amount_out(
    amount_in: u128,
    reserve_in: u128,
    reserve_out: u128,
) -> Result<u128, ExchangeError> {
    if reserve_in == 0 || reserve_out == 0 {
        return Err(ExchangeError::InvalidReserves);
    }
    let denominator = reserve_in
        .checked_add(amount_in)
        .ok_or(ExchangeError::Overflow)?;
    mul_div(amount_in, reserve_out, denominator)
}

/// Spot price of the first asset in units of the second, scaled by
/// `PRICE_SCALE`.
pub fn spot_price(reserve_a: u128, reserve_b: u128) -> Result<u128, ExchangeError> {
    if reserve_a == 0 {
        return Err(ExchangeError::EmptyPool);
    }
    mul_div(reserve_b, PRICE_SCALE, reserve_a)
}

/// Integer square root via the Babylonian method.
///
/// Returns the unique `z` with `z*z <= y < (z+1)*(z+1)`; terminates in
/// O(log y) iterations.
pub fn integer_sqrt(y: u128) -> u128 {
    if y == 0 {
        return 0;
    }
    if y < 4 {
        return 1;
    }
    let mut z = y;
    let mut x = y / 2 + 1;
    while x < z {
        z = x;
        x = (y / x + x) / 2;
    }
    z
}
