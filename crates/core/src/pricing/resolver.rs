//! Price specification resolution.
//!
//! Given any two of {amount ex VAT, amount inc VAT, VAT percent}, derives the
//! third:
//! - ex + vat: inc = ex × (1 + vat/100)
//! - inc + vat: ex = inc / (1 + vat/100)
//! - ex + inc: vat = (inc/ex − 1) × 100
//!
//! When all three are set, `SpecPrecedence` picks the pair that wins and the
//! third value is recomputed. No intermediate rounding is applied.

use rust_decimal::Decimal;
use vatsplit_shared::types::percent_factor;

use super::error::{PricingError, Violation, ViolationKind};
use super::types::{PriceSpec, ResolvedPrice, SpecPrecedence};

/// Checks a price specification and returns every problem found.
///
/// `precedence` selects the pair of fields that is used when all three are
/// set; that pair is checked the same way a two-field specification is. An
/// empty result means `resolve_with` succeeds with the same precedence.
#[must_use]
pub fn check_spec(spec: &PriceSpec, precedence: SpecPrecedence) -> Vec<ViolationKind> {
    let mut problems = Vec::new();

    if spec.field_count() < 2 {
        problems.push(ViolationKind::MissingPriceFields {
            amount_ex_vat: spec.amount_ex_vat.is_some(),
            amount_inc_vat: spec.amount_inc_vat.is_some(),
            vat_percent: spec.vat_percent.is_some(),
        });
    }

    if let Some(ex) = spec.amount_ex_vat.filter(|v| *v < Decimal::ZERO) {
        problems.push(ViolationKind::NegativeAmountExVat(ex));
    }
    if let Some(inc) = spec.amount_inc_vat.filter(|v| *v < Decimal::ZERO) {
        problems.push(ViolationKind::NegativeAmountIncVat(inc));
    }
    if let Some(vat) = spec.vat_percent.filter(|v| *v < Decimal::ZERO) {
        problems.push(ViolationKind::NegativeVatPercent(vat));
    }

    // A rate derived from both amounts must exist and be non-negative.
    if uses_both_amounts(spec, precedence) {
        if let (Some(ex), Some(inc)) = (spec.amount_ex_vat, spec.amount_inc_vat) {
            if ex.is_zero() && !inc.is_zero() {
                problems.push(ViolationKind::UndeterminedVatPercent(inc));
            } else if ex > Decimal::ZERO && inc >= Decimal::ZERO && inc < ex {
                problems.push(
                    derive_vat_percent(ex, inc)
                        .map_or(ViolationKind::AmountOutOfRange, ViolationKind::NegativeVatPercent),
                );
            }
        }
    }

    if problems.is_empty() && derive(spec, precedence).is_none() {
        problems.push(ViolationKind::AmountOutOfRange);
    }

    problems
}

/// Resolves a specification using the default precedence.
///
/// # Errors
///
/// Returns `PricingError::InvalidSpecification` listing every problem found.
pub fn resolve(spec: &PriceSpec) -> Result<ResolvedPrice, PricingError> {
    resolve_with(spec, SpecPrecedence::default())
}

/// Resolves a specification, letting `precedence` decide over-specified input.
///
/// # Errors
///
/// Returns `PricingError::InvalidSpecification` listing every problem found.
pub fn resolve_with(
    spec: &PriceSpec,
    precedence: SpecPrecedence,
) -> Result<ResolvedPrice, PricingError> {
    let problems = check_spec(spec, precedence);
    if let Some(err) =
        PricingError::from_violations(problems.into_iter().map(Violation::unlocated).collect())
    {
        return Err(err);
    }
    derive(spec, precedence).ok_or_else(PricingError::out_of_range)
}

/// True if the VAT percent is derived from both amounts.
fn uses_both_amounts(spec: &PriceSpec, precedence: SpecPrecedence) -> bool {
    match (spec.amount_ex_vat, spec.amount_inc_vat, spec.vat_percent) {
        (Some(_), Some(_), None) => true,
        (Some(_), Some(_), Some(_)) => precedence == SpecPrecedence::ExVatAndIncVat,
        _ => false,
    }
}

/// Derives the missing field of a specification.
///
/// Returns `None` if fewer than two fields are set or a derived value does
/// not fit in a `Decimal`.
pub(crate) fn derive(spec: &PriceSpec, precedence: SpecPrecedence) -> Option<ResolvedPrice> {
    match (spec.amount_ex_vat, spec.amount_inc_vat, spec.vat_percent) {
        (Some(ex), Some(inc), Some(vat)) => {
            let resolved = match precedence {
                SpecPrecedence::ExVatAndVat => from_ex_vat(ex, vat),
                SpecPrecedence::IncVatAndVat => from_inc_vat(inc, vat),
                SpecPrecedence::ExVatAndIncVat => from_both_amounts(ex, inc, vat),
            }?;
            if resolved.amount_ex_vat != ex
                || resolved.amount_inc_vat != inc
                || resolved.vat_percent != vat
            {
                tracing::debug!(
                    amount_ex_vat = %ex,
                    amount_inc_vat = %inc,
                    vat_percent = %vat,
                    ?precedence,
                    "Inconsistent price specification, recomputing third field"
                );
            }
            Some(resolved)
        }
        (Some(ex), None, Some(vat)) => from_ex_vat(ex, vat),
        (None, Some(inc), Some(vat)) => from_inc_vat(inc, vat),
        (Some(ex), Some(inc), None) => from_both_amounts(ex, inc, Decimal::ZERO),
        _ => None,
    }
}

fn from_ex_vat(ex: Decimal, vat: Decimal) -> Option<ResolvedPrice> {
    Some(ResolvedPrice {
        amount_ex_vat: ex,
        amount_inc_vat: ex.checked_mul(percent_factor(vat))?,
        vat_percent: vat,
    })
}

fn from_inc_vat(inc: Decimal, vat: Decimal) -> Option<ResolvedPrice> {
    Some(ResolvedPrice {
        amount_ex_vat: inc.checked_div(percent_factor(vat))?,
        amount_inc_vat: inc,
        vat_percent: vat,
    })
}

/// `zero_rate` is the rate used when both amounts are zero.
fn from_both_amounts(ex: Decimal, inc: Decimal, zero_rate: Decimal) -> Option<ResolvedPrice> {
    let vat_percent = if ex.is_zero() {
        zero_rate
    } else {
        derive_vat_percent(ex, inc)?
    };
    Some(ResolvedPrice {
        amount_ex_vat: ex,
        amount_inc_vat: inc,
        vat_percent,
    })
}

fn derive_vat_percent(ex: Decimal, inc: Decimal) -> Option<Decimal> {
    let ratio = inc.checked_div(ex)?;
    Some(
        ratio
            .checked_sub(Decimal::ONE)?
            .checked_mul(Decimal::ONE_HUNDRED)?
            .normalize(),
    )
}
