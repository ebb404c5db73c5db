//! Fixed decimal precision for indicator outputs.
//!
//! Price-scale values (prices, averages, bands, oscillators) carry 2 decimals and
//! MACD-scale values carry 4, so repeated runs compare equal and display cleanly.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

pub const PRICE_DECIMALS: u32 = 2;
pub const MACD_DECIMALS: u32 = 4;

/// Round `value` to `decimals` places, half away from zero.
/// Non-finite values are returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

pub fn round_price(value: f64) -> f64 {
    round_to(value, PRICE_DECIMALS)
}

pub fn round_macd(value: f64) -> f64 {
    round_to(value, MACD_DECIMALS)
}

pub fn round_series(values: &[f64], decimals: u32) -> Vec<f64> {
    values.iter().map(|&v| round_to(v, decimals)).collect()
}
