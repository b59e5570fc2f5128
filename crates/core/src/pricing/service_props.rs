//! Property-based tests for `PricingService`.
//!
//! Feature: pricing-core
//! - Property 3: Mode Determinism
//! - Property 4: Bucket Conservation
//! - Property 5: Relative Discount Conservation
//! - Property 6: Fixed Discount Conservation
//! - Property 7: Uniform Row Mode

use proptest::prelude::*;
use rust_decimal::Decimal;
use vatsplit_shared::PricingConfig;

use super::service::PricingService;
use super::types::{Discount, OrderInput, OrderLine, PriceMode, PriceSpec};

/// Strategy to generate unit prices (0.01 to 10,000.00).
fn unit_price() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate quantities (1 to 20).
fn quantity() -> impl Strategy<Value = Decimal> {
    (1i64..=20i64).prop_map(Decimal::from)
}

/// Strategy to generate common VAT rates.
fn vat_percent() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::ZERO),
        Just(Decimal::from(6)),
        Just(Decimal::from(10)),
        Just(Decimal::from(12)),
        Just(Decimal::from(20)),
        Just(Decimal::from(25)),
    ]
}

/// Strategy to generate a price given either ex VAT only or inc VAT.
fn price_spec() -> impl Strategy<Value = PriceSpec> {
    (unit_price(), vat_percent(), any::<bool>()).prop_map(|(amount, vat, ex_only)| {
        if ex_only {
            PriceSpec::ex_vat(amount, vat)
        } else {
            PriceSpec::inc_vat(amount, vat)
        }
    })
}

/// Strategy to generate 1-8 order rows.
fn order_rows() -> impl Strategy<Value = Vec<OrderLine>> {
    prop::collection::vec(
        (price_spec(), quantity()).prop_map(|(spec, qty)| OrderLine::order_row(spec, qty)),
        1..8,
    )
}

/// Strategy to generate 1-8 order rows priced ex VAT only.
fn ex_vat_rows() -> impl Strategy<Value = Vec<OrderLine>> {
    prop::collection::vec(
        (unit_price(), vat_percent(), quantity())
            .prop_map(|(amount, vat, qty)| OrderLine::order_row(PriceSpec::ex_vat(amount, vat), qty)),
        1..8,
    )
}

/// Strategy to generate discount percentages (0.00% to 100.00%).
fn discount_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|v| Decimal::new(v, 2))
}

fn order_of(lines: Vec<OrderLine>) -> OrderInput {
    OrderInput {
        lines,
        ..OrderInput::default()
    }
}

fn cents_per_bucket(buckets: usize) -> Decimal {
    Decimal::new(1, 2) * Decimal::from(buckets)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 3: Mode Determinism**
    ///
    /// *For any* set of lines without discounts, the mode is `ExVat` iff at
    /// least one line is priced ex VAT + rate without an inc VAT amount.
    #[test]
    fn prop_mode_determinism(lines in order_rows()) {
        let any_ex_only = lines.iter().any(|l| l.price.is_ex_vat_only());
        let order = order_of(lines);

        let expected = if any_ex_only { PriceMode::ExVat } else { PriceMode::IncVat };
        prop_assert_eq!(PricingService::determine_mode(&order), expected);

        let canonical = PricingService::canonicalize(&order, &PricingConfig::default()).unwrap();
        prop_assert_eq!(canonical.mode, expected);
    }

    /// **Property 4: Bucket Conservation**
    ///
    /// *For any* order, Σ bucket ex VAT equals Σ order row ex VAT totals and
    /// no rate appears in two buckets.
    #[test]
    fn prop_bucket_conservation(lines in ex_vat_rows()) {
        let expected: Decimal = lines
            .iter()
            .filter_map(|l| l.price.amount_ex_vat.map(|ex| ex * l.quantity))
            .sum();
        let order = order_of(lines);

        let buckets = PricingService::vat_buckets(&order, &PricingConfig::default()).unwrap();
        let total: Decimal = buckets.iter().map(|b| b.sum_ex_vat).sum();
        prop_assert_eq!(total, expected);

        for (i, a) in buckets.iter().enumerate() {
            for b in &buckets[i + 1..] {
                prop_assert_ne!(a.vat_percent, b.vat_percent);
            }
        }
    }

    /// **Property 5: Relative Discount Conservation**
    ///
    /// *For any* ex VAT order and p%, the discount rows sum to
    /// −p% × Σ bucket ex VAT within one cent per bucket.
    #[test]
    fn prop_relative_discount_conservation(lines in ex_vat_rows(), percent in discount_percent()) {
        let order = order_of(lines).with_discount(Discount::relative(percent));
        let config = PricingConfig::default();

        let buckets = PricingService::vat_buckets(&order, &config).unwrap();
        let bucket_total: Decimal = buckets.iter().map(|b| b.sum_ex_vat).sum();
        let expected = -(bucket_total * percent / Decimal::ONE_HUNDRED);

        let canonical = PricingService::canonicalize(&order, &config).unwrap();
        prop_assert_eq!(canonical.mode, PriceMode::ExVat);
        let emitted: Decimal = canonical.discount_rows().map(|r| r.price_per_unit).sum();

        prop_assert!(canonical.discount_rows().count() <= buckets.len());
        prop_assert!(
            (emitted - expected).abs() <= cents_per_bucket(buckets.len()),
            "emitted {} expected {}", emitted, expected
        );
    }

    /// **Property 6: Fixed Discount Conservation**
    ///
    /// *For any* inc VAT order and a rate-less inc VAT amount, the discount
    /// rows (inc VAT) sum to −amount within one cent per bucket.
    #[test]
    fn prop_fixed_discount_conservation(
        rows in prop::collection::vec((unit_price(), vat_percent(), quantity()), 1..8),
        amount in unit_price(),
    ) {
        let lines = rows
            .into_iter()
            .map(|(inc, vat, qty)| OrderLine::order_row(PriceSpec::inc_vat(inc, vat), qty))
            .collect();
        let order = order_of(lines).with_discount(Discount::fixed_inc_vat(amount));
        let config = PricingConfig::default();

        let canonical = PricingService::canonicalize(&order, &config).unwrap();
        prop_assert_eq!(canonical.mode, PriceMode::IncVat);

        let buckets = PricingService::vat_buckets(&order, &config).unwrap();
        let emitted: Decimal = canonical.discount_rows().map(|r| r.price_per_unit).sum();
        prop_assert!(
            (emitted + amount).abs() <= cents_per_bucket(buckets.len()),
            "emitted {} amount {}", emitted, amount
        );
    }

    /// **Property 7: Uniform Row Mode**
    ///
    /// *For any* order, every row carries the order's `price_including_vat`
    /// flag and a price rounded to two decimals.
    #[test]
    fn prop_rows_uniform_and_rounded(lines in order_rows(), percent in discount_percent()) {
        let order = order_of(lines).with_discount(Discount::relative(percent));
        let canonical = PricingService::canonicalize(&order, &PricingConfig::default()).unwrap();

        for row in &canonical.rows {
            prop_assert_eq!(row.mode(), canonical.mode);
            prop_assert_eq!(row.price_per_unit, row.price_per_unit.round_dp(2));
        }
    }
}
