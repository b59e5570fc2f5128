//! Money rounding primitives with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every amount, rate, and quantity is a `rust_decimal::Decimal`.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places of a transmitted money amount (cents).
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Rounds a value using Banker's Rounding (round half to even).
///
/// - 2.5 → 2, 3.5 → 4
/// - 0.125 → 0.12, 0.135 → 0.14 (at 2 decimals)
#[must_use]
pub fn round_half_even(value: Decimal, decimal_places: u32) -> Decimal {
    value.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointNearestEven)
}

/// Returns true if two values differ by no more than `tolerance`.
#[must_use]
pub fn approx_eq(a: Decimal, b: Decimal, tolerance: Decimal) -> bool {
    (a - b).abs() <= tolerance
}

/// Converts a percentage (e.g. 25) into its multiplier factor (1.25).
#[must_use]
pub fn percent_factor(percent: Decimal) -> Decimal {
    Decimal::ONE + percent / Decimal::ONE_HUNDRED
}
