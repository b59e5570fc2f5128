//! Rounding policy for finalized amounts.
//!
//! CRITICAL: Rounding is applied once, when a `MoneyRow` is finalized or a
//! total is computed. Ratios, bucket sums and discount shares stay unrounded.
//! Uses Banker's Rounding (MidpointNearestEven):
//! - 2.125 → 2.12, 2.135 → 2.14
//! - avoids a systematic upward bias when an amount is split over buckets

use rust_decimal::Decimal;
use vatsplit_shared::PricingConfig;
use vatsplit_shared::types::{MONEY_DECIMAL_PLACES, round_half_even};

/// Rounds transmitted amounts to a fixed number of decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rounding {
    decimal_places: u32,
}

impl Rounding {
    /// Creates a rounding policy with the given decimal places.
    #[must_use]
    pub const fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    /// Creates the rounding policy configured for the engine.
    #[must_use]
    pub const fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.decimal_places)
    }

    /// Returns the configured decimal places.
    #[must_use]
    pub const fn decimal_places(&self) -> u32 {
        self.decimal_places
    }

    /// Rounds a value using Banker's Rounding.
    #[must_use]
    pub fn round(&self, value: Decimal) -> Decimal {
        round_half_even(value, self.decimal_places)
    }
}

impl Default for Rounding {
    fn default() -> Self {
        Self::new(MONEY_DECIMAL_PLACES)
    }
}
