//! Order pricing normalization and VAT discount distribution.
//!
//! This module implements the pricing pipeline:
//! - Domain types for order input and canonical rows
//! - Price specification resolution (any two of ex VAT, inc VAT, VAT %)
//! - Batch validation of orders
//! - Order-wide VAT mode decision
//! - VAT bucket aggregation over order rows
//! - Discount distribution over VAT buckets
//! - Banker's rounding of finalized amounts
//! - One-shot VAT mode retry protocol

pub mod buckets;
pub mod canonicalizer;
pub mod discount;
pub mod error;
pub mod resolver;
pub mod retry;
pub mod rounding;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod resolver_props;
#[cfg(test)]
mod service_props;

pub use error::{LineRef, LineRole, PricingError, Violation, ViolationKind};
pub use resolver::{resolve, resolve_with};
pub use retry::{RetryPolicy, SubmissionState, submit_with_mode_retry};
pub use rounding::Rounding;
pub use service::PricingService;
pub use types::{
    CanonicalOrder, Discount, FixedDiscount, LineIdentity, LineKind, MoneyRow, OrderInput,
    OrderLine, OrderTotals, PriceMode, PriceSpec, RelativeDiscount, ResolvedPrice, RowKind, Sign,
    SpecPrecedence, VatBucket,
};
