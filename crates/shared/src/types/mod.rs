//! Common types used across the application.

pub mod money;

pub use money::{MONEY_DECIMAL_PLACES, approx_eq, percent_factor, round_half_even};
