//! Discount distribution over VAT buckets.
//!
//! Shares are computed in ex-VAT terms and re-expressed in the order's mode;
//! only the emitted price is rounded.
//!
//! - Relative `p%`: share per bucket = bucket ex VAT × p/100
//! - Fixed with a rate: one row at that rate
//! - Fixed without a rate: split by ex-VAT weight `w = bucket ex VAT / total`.
//!   An ex-VAT amount is split as is (`x = amount`); an inc-VAT amount solves
//!   `Σ w × (1 + rate/100) × x = amount` first. Each share is `x × w`.

use rust_decimal::Decimal;
use vatsplit_shared::types::percent_factor;

use super::buckets::total_ex_vat;
use super::error::{PricingError, Violation, ViolationKind};
use super::resolver;
use super::rounding::Rounding;
use super::types::{
    Discount, FixedDiscount, LineIdentity, MoneyRow, PriceMode, RelativeDiscount, RowKind,
    SpecPrecedence, VatBucket,
};

/// Turns one discount into negative rows, one per bucket with a nonzero share.
///
/// # Errors
///
/// Returns `PricingError::NoVatBucketsAvailable` for a rate-less fixed
/// discount when the buckets hold no ex-VAT amount, and
/// `PricingError::InvalidSpecification` for a fixed discount with no amount,
/// one whose explicit rate cannot be resolved, or a share that does not fit
/// in a `Decimal`.
pub fn distribute(
    discount: &Discount,
    buckets: &[VatBucket],
    mode: PriceMode,
    precedence: SpecPrecedence,
    rounding: &Rounding,
) -> Result<Vec<MoneyRow>, PricingError> {
    let rows = match discount {
        Discount::Relative(relative) => distribute_relative(relative, buckets, mode, rounding)?,
        Discount::Fixed(fixed) if fixed.has_explicit_rate() => {
            vec![fixed_at_rate(fixed, mode, precedence, rounding)?]
        }
        Discount::Fixed(fixed) => distribute_fixed(fixed, buckets, mode, rounding)?,
    };

    for row in &rows {
        tracing::debug!(
            price_per_unit = %row.price_per_unit,
            vat_percent = %row.vat_percent,
            ?mode,
            "Distributed discount row"
        );
    }

    Ok(rows)
}

fn distribute_relative(
    discount: &RelativeDiscount,
    buckets: &[VatBucket],
    mode: PriceMode,
    rounding: &Rounding,
) -> Result<Vec<MoneyRow>, PricingError> {
    let ratio = discount.percent / Decimal::ONE_HUNDRED;
    let mut rows = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let share = bucket
            .sum_ex_vat
            .checked_mul(ratio)
            .ok_or_else(PricingError::out_of_range)?;
        if !share.is_zero() {
            rows.push(discount_row(
                bucket.vat_percent,
                share,
                mode,
                rounding,
                &discount.identity,
            )?);
        }
    }
    Ok(rows)
}

fn fixed_at_rate(
    discount: &FixedDiscount,
    mode: PriceMode,
    precedence: SpecPrecedence,
    rounding: &Rounding,
) -> Result<MoneyRow, PricingError> {
    let resolved = resolver::resolve_with(&discount.price_spec(), precedence)?;
    Ok(MoneyRow {
        kind: RowKind::Discount,
        price_per_unit: -rounding.round(resolved.amount_in(mode)),
        vat_percent: resolved.vat_percent,
        price_including_vat: mode.price_including_vat(),
        quantity: Decimal::ONE,
        discount_percent: Decimal::ZERO,
        identity: discount.identity.clone(),
    })
}

fn distribute_fixed(
    discount: &FixedDiscount,
    buckets: &[VatBucket],
    mode: PriceMode,
    rounding: &Rounding,
) -> Result<Vec<MoneyRow>, PricingError> {
    if discount.amount_ex_vat.is_none() && discount.amount_inc_vat.is_none() {
        return Err(PricingError::InvalidSpecification {
            violations: vec![Violation::unlocated(ViolationKind::MissingDiscountAmount)],
        });
    }

    let total = total_ex_vat(buckets).ok_or_else(PricingError::out_of_range)?;
    if total.is_zero() {
        return Err(PricingError::NoVatBucketsAvailable);
    }

    let weights = buckets
        .iter()
        .map(|bucket| {
            bucket
                .sum_ex_vat
                .checked_div(total)
                .map(|weight| (bucket, weight))
                .ok_or_else(PricingError::out_of_range)
        })
        .collect::<Result<Vec<(&VatBucket, Decimal)>, _>>()?;

    let base = match (discount.amount_ex_vat, discount.amount_inc_vat) {
        (Some(ex), _) => Some(ex),
        (None, Some(inc)) => weights
            .iter()
            .try_fold(Decimal::ZERO, |acc, (bucket, weight)| {
                acc.checked_add(weight.checked_mul(percent_factor(bucket.vat_percent))?)
            })
            .and_then(|denominator| inc.checked_div(denominator)),
        (None, None) => None,
    }
    .ok_or_else(PricingError::out_of_range)?;

    let mut rows = Vec::with_capacity(weights.len());
    for (bucket, weight) in weights {
        let share = base
            .checked_mul(weight)
            .ok_or_else(PricingError::out_of_range)?;
        if !share.is_zero() {
            rows.push(discount_row(
                bucket.vat_percent,
                share,
                mode,
                rounding,
                &discount.identity,
            )?);
        }
    }
    Ok(rows)
}

fn discount_row(
    vat_percent: Decimal,
    share_ex_vat: Decimal,
    mode: PriceMode,
    rounding: &Rounding,
    identity: &LineIdentity,
) -> Result<MoneyRow, PricingError> {
    let amount = match mode {
        PriceMode::ExVat => share_ex_vat,
        PriceMode::IncVat => share_ex_vat
            .checked_mul(percent_factor(vat_percent))
            .ok_or_else(PricingError::out_of_range)?,
    };
    Ok(MoneyRow {
        kind: RowKind::Discount,
        price_per_unit: -rounding.round(amount),
        vat_percent,
        price_including_vat: mode.price_including_vat(),
        quantity: Decimal::ONE,
        discount_percent: Decimal::ZERO,
        identity: identity.clone(),
    })
}
