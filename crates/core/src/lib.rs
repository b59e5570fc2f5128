//! Core pricing logic for Vatsplit.
//!
//! This crate contains pure business logic with ZERO transport or
//! serialization dependencies. It turns heterogeneously priced order lines
//! into one canonical, cent-exact representation per order.
//!
//! # Modules
//!
//! - `pricing` - VAT mode decision, bucket aggregation and discount distribution
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use vatsplit_core::pricing::{
//!     Discount, OrderInput, OrderLine, PriceMode, PriceSpec, PricingService,
//! };
//! use vatsplit_shared::PricingConfig;
//!
//! let order = OrderInput::new()
//!     .with_line(OrderLine::order_row(PriceSpec::ex_vat(dec!(60), dec!(20)), dec!(1)))
//!     .with_line(OrderLine::order_row(PriceSpec::ex_vat(dec!(30), dec!(10)), dec!(1)))
//!     .with_discount(Discount::relative(dec!(10)));
//!
//! let canonical = PricingService::canonicalize(&order, &PricingConfig::default()).unwrap();
//! assert_eq!(canonical.mode, PriceMode::ExVat);
//! let discounts: Vec<_> = canonical.discount_rows().map(|r| r.price_per_unit).collect();
//! assert_eq!(discounts, vec![dec!(-6.00), dec!(-3.00)]);
//! ```

pub mod pricing;
