//! VAT bucket aggregation.
//!
//! Only order rows contribute; fees and discounts never form buckets.
//! Buckets keep the order in which their rate first appears so discount rows
//! come out deterministically.

use rust_decimal::Decimal;
use vatsplit_shared::types::approx_eq;

use super::canonicalizer::ResolvedLine;
use super::error::PricingError;
use super::types::{PriceMode, VatBucket};

/// Groups order rows by VAT rate and sums their ex and inc VAT totals.
///
/// Two rates within `tolerance` of each other share a bucket, keyed by the
/// first rate seen. Row-level discounts are applied to each contribution.
///
/// # Errors
///
/// Returns `PricingError::InvalidSpecification` with
/// `ViolationKind::AmountOutOfRange` if a sum does not fit in a `Decimal`.
pub fn aggregate(
    lines: &[ResolvedLine<'_>],
    tolerance: Decimal,
) -> Result<Vec<VatBucket>, PricingError> {
    let mut buckets: Vec<VatBucket> = Vec::new();

    for line in lines.iter().filter(|l| l.is_order_row()) {
        let rate = line.price.vat_percent;
        let ex = line
            .line_total(PriceMode::ExVat)
            .ok_or_else(PricingError::out_of_range)?;
        let inc = line
            .line_total(PriceMode::IncVat)
            .ok_or_else(PricingError::out_of_range)?;

        match buckets
            .iter_mut()
            .find(|b| approx_eq(b.vat_percent, rate, tolerance))
        {
            Some(bucket) => {
                bucket.sum_ex_vat = bucket
                    .sum_ex_vat
                    .checked_add(ex)
                    .ok_or_else(PricingError::out_of_range)?;
                bucket.sum_inc_vat = bucket
                    .sum_inc_vat
                    .checked_add(inc)
                    .ok_or_else(PricingError::out_of_range)?;
            }
            None => buckets.push(VatBucket {
                vat_percent: rate,
                sum_ex_vat: ex,
                sum_inc_vat: inc,
            }),
        }
    }

    for bucket in &buckets {
        tracing::debug!(
            vat_percent = %bucket.vat_percent,
            sum_ex_vat = %bucket.sum_ex_vat,
            sum_inc_vat = %bucket.sum_inc_vat,
            "Aggregated VAT bucket"
        );
    }

    Ok(buckets)
}

/// Σ ex VAT over all buckets, `None` on overflow.
#[must_use]
pub fn total_ex_vat(buckets: &[VatBucket]) -> Option<Decimal> {
    buckets
        .iter()
        .try_fold(Decimal::ZERO, |acc, b| acc.checked_add(b.sum_ex_vat))
}
