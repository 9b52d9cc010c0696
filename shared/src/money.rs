//! Money calculation utilities using rust_decimal for precision
//!
//! Prices travel as `f64` on the wire; every sum is done in `Decimal`
//! and rounded once at the end (2 decimal places, half-up).

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price
pub const MAX_PRICE: f64 = 1_000_000.0;

/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;

/// Convert an `f64` price into `Decimal`, treating non-finite input as zero
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Round and convert back to `f64` for serialization
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `price * quantity` as an exact decimal, saturating instead of overflowing
#[inline]
pub fn line_total(price: f64, quantity: i32) -> Decimal {
    to_decimal(price).saturating_mul(Decimal::from(quantity))
}

/// Sum `(price, quantity)` pairs and round once
pub fn sum_lines<I>(lines: I) -> f64
where
    I: IntoIterator<Item = (f64, i32)>,
{
    let total = lines
        .into_iter()
        .map(|(price, quantity)| line_total(price, quantity))
        .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line));
    to_f64(total)
}

/// Whether two monetary values agree to the cent
pub fn money_eq(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() < Decimal::new(1, DECIMAL_PLACES)
}
