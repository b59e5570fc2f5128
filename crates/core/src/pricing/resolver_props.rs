//! Property-based tests for price specification resolution.
//!
//! Feature: pricing-core
//! - Property 1: Resolve Round-Trip
//! - Property 2: Resolved Fields Are Consistent

use proptest::prelude::*;
use rust_decimal::Decimal;
use vatsplit_shared::types::percent_factor;

use super::resolver::resolve;
use super::types::PriceSpec;

/// Strategy to generate non-negative amounts (0.00 to 1,000,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive amounts (0.01 to 1,000,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate VAT rates (0.00% to 50.00%).
fn vat_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=5_000i64).prop_map(|v| Decimal::new(v, 2))
}

fn tolerance() -> Decimal {
    Decimal::new(1, 10)
}

fn close(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= tolerance()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 1: Resolve Round-Trip (ex VAT + rate)**
    ///
    /// *For any* ex VAT amount and rate, resolving and re-deriving from the
    /// inc VAT side returns the original ex VAT amount.
    #[test]
    fn prop_ex_vat_round_trip(ex in amount(), vat in vat_percent()) {
        let resolved = resolve(&PriceSpec::ex_vat(ex, vat)).unwrap();
        prop_assert_eq!(resolved.amount_ex_vat, ex);
        prop_assert_eq!(resolved.vat_percent, vat);

        let back = resolve(&PriceSpec::inc_vat(resolved.amount_inc_vat, vat)).unwrap();
        prop_assert!(close(back.amount_ex_vat, ex), "{} != {}", back.amount_ex_vat, ex);
    }

    /// **Property 1: Resolve Round-Trip (inc VAT + rate)**
    #[test]
    fn prop_inc_vat_round_trip(inc in amount(), vat in vat_percent()) {
        let resolved = resolve(&PriceSpec::inc_vat(inc, vat)).unwrap();
        prop_assert_eq!(resolved.amount_inc_vat, inc);

        let back = resolve(&PriceSpec::ex_vat(resolved.amount_ex_vat, vat)).unwrap();
        prop_assert!(close(back.amount_inc_vat, inc), "{} != {}", back.amount_inc_vat, inc);
    }

    /// **Property 1: Resolve Round-Trip (both amounts)**
    ///
    /// *For any* ex VAT amount and inc VAT amount not below it, the derived
    /// rate reproduces the inc VAT amount.
    #[test]
    fn prop_both_amounts_round_trip(ex in positive_amount(), extra in amount()) {
        let inc = ex + extra;
        let resolved = resolve(&PriceSpec::ex_and_inc_vat(ex, inc)).unwrap();
        prop_assert!(resolved.vat_percent >= Decimal::ZERO);

        let back = resolve(&PriceSpec::ex_vat(ex, resolved.vat_percent)).unwrap();
        prop_assert!(close(back.amount_inc_vat, inc), "{} != {}", back.amount_inc_vat, inc);
    }

    /// **Property 2: Resolved Fields Are Consistent**
    ///
    /// *For any* valid two-field specification, inc = ex × (1 + vat/100).
    #[test]
    fn prop_resolved_fields_consistent(ex in amount(), vat in vat_percent(), from_inc in any::<bool>()) {
        let spec = if from_inc {
            PriceSpec::inc_vat(ex, vat)
        } else {
            PriceSpec::ex_vat(ex, vat)
        };
        let resolved = resolve(&spec).unwrap();
        let expected = resolved.amount_ex_vat * percent_factor(resolved.vat_percent);
        prop_assert!(close(resolved.amount_inc_vat, expected));
    }
}
