//! Pricing service for order normalization.
//!
//! This module ties the pipeline together: validation, mode decision,
//! per-line resolution, bucket aggregation, discount distribution and totals.
//! It is pure business logic with no I/O.

use rust_decimal::Decimal;
use vatsplit_shared::PricingConfig;
use vatsplit_shared::types::percent_factor;

use super::buckets;
use super::canonicalizer::{self, ResolvedLine};
use super::discount;
use super::error::PricingError;
use super::rounding::Rounding;
use super::types::{CanonicalOrder, MoneyRow, OrderInput, OrderTotals, PriceMode, VatBucket};
use super::validation;

/// Pricing service for order normalization.
///
/// Every call works on the caller's order alone and returns new values;
/// orders can be normalized concurrently without coordination.
pub struct PricingService;

impl PricingService {
    /// Validate an order, reporting every problem at once.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidSpecification` listing every violation.
    pub fn validate(order: &OrderInput) -> Result<(), PricingError> {
        validation::validate_order(order)
    }

    /// Decide the order-wide mode from its rows, fees and fixed discounts.
    #[must_use]
    pub fn determine_mode(order: &OrderInput) -> PriceMode {
        canonicalizer::determine_mode(&order.lines, &order.discounts)
    }

    /// Return the opposite mode, used once by the retry protocol.
    #[must_use]
    pub const fn flip(mode: PriceMode) -> PriceMode {
        mode.flip()
    }

    /// Normalize an order into canonical rows.
    ///
    /// # Errors
    ///
    /// See [`PricingService::canonicalize_with_mode`].
    pub fn canonicalize(
        order: &OrderInput,
        config: &PricingConfig,
    ) -> Result<CanonicalOrder, PricingError> {
        Self::canonicalize_with_mode(order, config, None)
    }

    /// Normalize an order, optionally forcing its mode.
    ///
    /// Steps:
    /// 1. Validates every line and discount (batch)
    /// 2. Decides the mode, unless `forced` is given
    /// 3. Resolves each line's missing price field
    /// 4. Aggregates order rows into VAT buckets
    /// 5. Distributes each discount over the buckets
    /// 6. Calculates totals from the rounded rows
    ///
    /// Rows come out as order rows, then fees, then discount rows, each group
    /// in input order.
    ///
    /// # Arguments
    ///
    /// * `order` - The order to normalize
    /// * `config` - Rounding precision and VAT rate tolerance
    /// * `forced` - Mode to use instead of the decided one
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidSpecification` if any line or discount is
    /// invalid or an amount does not fit in a `Decimal`, or
    /// `PricingError::NoVatBucketsAvailable` if a rate-less fixed discount has
    /// no order rows to split over.
    pub fn canonicalize_with_mode(
        order: &OrderInput,
        config: &PricingConfig,
        forced: Option<PriceMode>,
    ) -> Result<CanonicalOrder, PricingError> {
        // 1. Validate
        Self::validate(order)?;

        // 2. Decide mode
        let decided = Self::determine_mode(order);
        let mode = forced.unwrap_or(decided);
        tracing::debug!(
            ?mode,
            ?decided,
            forced = forced.is_some(),
            lines = order.lines.len(),
            discounts = order.discounts.len(),
            "Decided VAT mode"
        );

        // 3. Resolve lines
        let rounding = Rounding::from_config(config);
        let resolved = canonicalizer::resolve_lines(&order.lines, order.precedence)?;
        let mut rows = canonicalizer::canonical_rows(&resolved, mode, &rounding);

        // 4. Buckets
        let buckets = Self::buckets(&resolved, config)?;

        // 5. Discounts
        for item in &order.discounts {
            rows.extend(discount::distribute(
                item,
                &buckets,
                mode,
                order.precedence,
                &rounding,
            )?);
        }

        // 6. Totals
        let totals = Self::calculate_totals(&rows, &rounding)?;

        tracing::info!(
            ?mode,
            rows = rows.len(),
            total_ex_vat = %totals.total_ex_vat,
            total_inc_vat = %totals.total_inc_vat,
            "Canonical order produced"
        );

        Ok(CanonicalOrder {
            mode,
            forced: forced.is_some(),
            rows,
            totals,
        })
    }

    /// Aggregate an order's rows into VAT buckets.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidSpecification` if any line is invalid or
    /// a bucket sum does not fit in a `Decimal`.
    pub fn vat_buckets(
        order: &OrderInput,
        config: &PricingConfig,
    ) -> Result<Vec<VatBucket>, PricingError> {
        Self::validate(order)?;
        let resolved = canonicalizer::resolve_lines(&order.lines, order.precedence)?;
        Self::buckets(&resolved, config)
    }

    fn buckets(
        resolved: &[ResolvedLine<'_>],
        config: &PricingConfig,
    ) -> Result<Vec<VatBucket>, PricingError> {
        buckets::aggregate(resolved, config.vat_rate_tolerance)
    }

    /// Calculate order totals from finalized rows.
    ///
    /// Each row total is `price × quantity × (1 − discount%)` in the row's
    /// mode, converted to the other basis with the row's rate; both sides are
    /// rounded per row before summing.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidSpecification` with
    /// `ViolationKind::AmountOutOfRange` if a total does not fit in a
    /// `Decimal`.
    pub fn calculate_totals(
        rows: &[MoneyRow],
        rounding: &Rounding,
    ) -> Result<OrderTotals, PricingError> {
        let mut total_ex_vat = Decimal::ZERO;
        let mut total_inc_vat = Decimal::ZERO;

        for row in rows {
            let (ex, inc) = row_amounts(row).ok_or_else(PricingError::out_of_range)?;
            total_ex_vat = total_ex_vat
                .checked_add(rounding.round(ex))
                .ok_or_else(PricingError::out_of_range)?;
            total_inc_vat = total_inc_vat
                .checked_add(rounding.round(inc))
                .ok_or_else(PricingError::out_of_range)?;
        }

        Ok(OrderTotals {
            total_ex_vat,
            total_vat: total_inc_vat
                .checked_sub(total_ex_vat)
                .ok_or_else(PricingError::out_of_range)?,
            total_inc_vat,
        })
    }
}

/// Ex and inc VAT totals of one row, unrounded.
fn row_amounts(row: &MoneyRow) -> Option<(Decimal, Decimal)> {
    let line = row
        .price_per_unit
        .checked_mul(row.quantity)?
        .checked_mul(Decimal::ONE - row.discount_percent / Decimal::ONE_HUNDRED)?;
    let factor = percent_factor(row.vat_percent);
    match row.mode() {
        PriceMode::ExVat => Some((line, line.checked_mul(factor)?)),
        PriceMode::IncVat => Some((line.checked_div(factor)?, line)),
    }
}
