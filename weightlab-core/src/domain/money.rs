//! Fixed-point price arithmetic.
//!
//! Cash, commission and P&L are carried as exact `Decimal` values. Running
//! averages are the only quantities that need division, and they are rounded
//! to [`PRICE_SCALE`] places with banker's rounding after every update so
//! thousands of incremental fills cannot accumulate drift.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on average prices.
pub const PRICE_SCALE: u32 = 8;

/// Round a per-share price to [`PRICE_SCALE`] places.
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Quantity-weighted running mean of a per-share price.
///
/// Returns `prev_mean` unchanged when the combined quantity is zero.
pub fn running_mean(prev_mean: Decimal, prev_qty: u64, price: Decimal, qty: u64) -> Decimal {
    let total = prev_qty.saturating_add(qty);
    if total == 0 {
        return prev_mean;
    }
    let weighted = prev_mean * Decimal::from(prev_qty) + price * Decimal::from(qty);
    round_price(weighted / Decimal::from(total))
}

/// Lossy conversion for the statistics boundary.
pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}
