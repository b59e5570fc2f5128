//! Batch validation of an order before normalization.
//!
//! Every line and discount is checked; all problems are collected in input
//! order instead of stopping at the first one.

use rust_decimal::Decimal;

use super::canonicalizer::ResolvedLine;
use super::error::{LineRef, LineRole, PricingError, Violation, ViolationKind};
use super::resolver::{self, check_spec};
use super::types::{Discount, LineKind, OrderInput, OrderLine, PriceMode, SpecPrecedence};

/// Validates every line and discount of an order.
///
/// # Errors
///
/// Returns `PricingError::InvalidSpecification` listing every violation found.
pub fn validate_order(order: &OrderInput) -> Result<(), PricingError> {
    let mut violations = Vec::new();

    for (index, line) in order.lines.iter().enumerate() {
        let location = line_ref(line, index);
        violations.extend(
            check_line(line, order.precedence)
                .into_iter()
                .map(|kind| Violation::at(location.clone(), kind)),
        );
    }

    for (index, discount) in order.discounts.iter().enumerate() {
        let location = LineRef {
            role: LineRole::Discount,
            index,
            name: discount.identity().name.clone(),
        };
        violations.extend(
            check_discount(discount, order.precedence)
                .into_iter()
                .map(|kind| Violation::at(location.clone(), kind)),
        );
    }

    match PricingError::from_violations(violations) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Checks a single order row or fee.
#[must_use]
pub fn check_line(line: &OrderLine, precedence: SpecPrecedence) -> Vec<ViolationKind> {
    let mut problems = check_spec(&line.price, precedence);

    if line.quantity < Decimal::ZERO {
        problems.push(ViolationKind::NegativeQuantity(line.quantity));
    }
    if !is_percentage(line.discount_percent) {
        problems.push(ViolationKind::RowDiscountOutOfRange(line.discount_percent));
    }

    if problems.is_empty() && !line_total_fits(line, precedence) {
        problems.push(ViolationKind::AmountOutOfRange);
    }

    problems
}

fn line_total_fits(line: &OrderLine, precedence: SpecPrecedence) -> bool {
    resolver::derive(&line.price, precedence).is_some_and(|price| {
        let resolved = ResolvedLine { line, price };
        resolved.line_total(PriceMode::ExVat).is_some()
            && resolved.line_total(PriceMode::IncVat).is_some()
    })
}

/// Checks a single order-level discount.
#[must_use]
pub fn check_discount(discount: &Discount, precedence: SpecPrecedence) -> Vec<ViolationKind> {
    match discount {
        Discount::Relative(relative) => {
            if is_percentage(relative.percent) {
                vec![]
            } else {
                vec![ViolationKind::DiscountPercentOutOfRange(relative.percent)]
            }
        }
        Discount::Fixed(fixed) => {
            if fixed.amount_ex_vat.is_none() && fixed.amount_inc_vat.is_none() {
                let mut problems = vec![ViolationKind::MissingDiscountAmount];
                if let Some(vat) = fixed.vat_percent.filter(|v| *v < Decimal::ZERO) {
                    problems.push(ViolationKind::NegativeVatPercent(vat));
                }
                problems
            } else if fixed.has_explicit_rate() {
                check_spec(&fixed.price_spec(), precedence)
            } else {
                // A single amount without a rate is split over the buckets.
                let mut problems = Vec::new();
                if let Some(ex) = fixed.amount_ex_vat.filter(|v| *v < Decimal::ZERO) {
                    problems.push(ViolationKind::NegativeAmountExVat(ex));
                }
                if let Some(inc) = fixed.amount_inc_vat.filter(|v| *v < Decimal::ZERO) {
                    problems.push(ViolationKind::NegativeAmountIncVat(inc));
                }
                problems
            }
        }
    }
}

fn line_ref(line: &OrderLine, index: usize) -> LineRef {
    let role = match line.kind {
        LineKind::OrderRow => LineRole::OrderRow,
        LineKind::ShippingFee => LineRole::ShippingFee,
        LineKind::InvoiceFee => LineRole::InvoiceFee,
    };
    LineRef {
        role,
        index,
        name: line.identity.name.clone(),
    }
}

fn is_percentage(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED
}
