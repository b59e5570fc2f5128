//! Order-wide VAT mode decision and canonical row construction.
//!
//! The backend accepts a single inclusive/exclusive mode per order. Any line
//! given ex VAT + rate without an inc VAT amount forces the whole order to
//! `ExVat`, and so does a fixed discount given ex VAT only. Otherwise the
//! order is sent `IncVat`. The decision is a pure scan and never changes per
//! line.

use rust_decimal::Decimal;

use super::error::PricingError;
use super::resolver;
use super::rounding::Rounding;
use super::types::{
    Discount, LineKind, MoneyRow, OrderLine, PriceMode, ResolvedPrice, RowKind, SpecPrecedence,
};

/// Decides the order-wide mode from order rows, fees and fixed discounts.
#[must_use]
pub fn determine_mode(lines: &[OrderLine], discounts: &[Discount]) -> PriceMode {
    if lines.iter().any(|line| line.price.is_ex_vat_only())
        || discounts.iter().any(Discount::is_ex_vat_only)
    {
        PriceMode::ExVat
    } else {
        PriceMode::IncVat
    }
}

/// An order line together with its fully resolved, unrounded unit price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLine<'a> {
    /// The caller's line.
    pub line: &'a OrderLine,
    /// Unit price with all three fields known.
    pub price: ResolvedPrice,
}

impl ResolvedLine<'_> {
    /// Returns true if the line is an order row (not a fee).
    #[must_use]
    pub fn is_order_row(&self) -> bool {
        self.line.kind == LineKind::OrderRow
    }

    /// Multiplier left after the row-level discount, e.g. 0.9 for 10%.
    #[must_use]
    pub fn discount_factor(&self) -> Decimal {
        Decimal::ONE - self.line.discount_percent / Decimal::ONE_HUNDRED
    }

    /// quantity × unit amount × (1 − row discount), unrounded.
    ///
    /// `None` if the product does not fit in a `Decimal`.
    #[must_use]
    pub fn line_total(&self, mode: PriceMode) -> Option<Decimal> {
        self.line
            .quantity
            .checked_mul(self.price.amount_in(mode))?
            .checked_mul(self.discount_factor())
    }

    /// Builds the canonical row in the given mode.
    #[must_use]
    pub fn to_money_row(&self, mode: PriceMode, rounding: &Rounding) -> MoneyRow {
        MoneyRow {
            kind: RowKind::from(self.line.kind),
            price_per_unit: rounding.round(self.price.amount_in(mode)),
            vat_percent: self.price.vat_percent,
            price_including_vat: mode.price_including_vat(),
            quantity: self.line.quantity,
            discount_percent: self.line.discount_percent,
            identity: self.line.identity.clone(),
        }
    }
}

/// Resolves every line of an already validated order, in input order.
///
/// # Errors
///
/// Returns `PricingError::InvalidSpecification` if a line cannot be resolved,
/// which validation rules out.
pub fn resolve_lines(
    lines: &[OrderLine],
    precedence: SpecPrecedence,
) -> Result<Vec<ResolvedLine<'_>>, PricingError> {
    lines
        .iter()
        .map(|line| {
            let price =
                resolver::derive(&line.price, precedence).ok_or_else(PricingError::out_of_range)?;
            Ok(ResolvedLine { line, price })
        })
        .collect()
}

/// Builds canonical rows: order rows first, then fees, each in input order.
#[must_use]
pub fn canonical_rows(
    resolved: &[ResolvedLine<'_>],
    mode: PriceMode,
    rounding: &Rounding,
) -> Vec<MoneyRow> {
    let rows = resolved.iter().filter(|r| r.is_order_row());
    let fees = resolved.iter().filter(|r| !r.is_order_row());
    rows.chain(fees)
        .map(|r| r.to_money_row(mode, rounding))
        .collect()
}
