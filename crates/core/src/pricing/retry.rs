//! One-shot VAT mode retry protocol.
//!
//! A backend may reject an inc-VAT order with an "ambiguous VAT mode" result
//! code. The caller then re-normalizes the same order with the mode flipped,
//! exactly once. The protocol has two states:
//!
//! ```text
//! Normal --(rejected inc-VAT submission)--> Flipped --(any failure)--> error
//! ```

use vatsplit_shared::{AppError, PricingConfig};

use super::error::PricingError;
use super::service::PricingService;
use super::types::{CanonicalOrder, OrderInput, PriceMode};

/// Where an order is in the retry protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    /// First submission, mode as decided.
    #[default]
    Normal,
    /// Mode has been flipped once; no further retry.
    Flipped,
}

impl SubmissionState {
    /// Moves to `Flipped` and returns the opposite of `mode`.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::ModeAlreadyFlipped` if already flipped.
    pub fn flip(self, mode: PriceMode) -> Result<(Self, PriceMode), PricingError> {
        match self {
            Self::Normal => Ok((Self::Flipped, PricingService::flip(mode))),
            Self::Flipped => Err(PricingError::ModeAlreadyFlipped),
        }
    }

    /// Returns true once the mode has been flipped.
    #[must_use]
    pub const fn is_flipped(self) -> bool {
        matches!(self, Self::Flipped)
    }
}

/// Decides whether a backend rejection warrants flipping the mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    codes: Vec<String>,
}

impl RetryPolicy {
    /// Creates a policy that flips on the given backend result codes.
    #[must_use]
    pub fn new(codes: Vec<String>) -> Self {
        Self { codes }
    }

    /// Creates the policy configured for the engine.
    #[must_use]
    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.ambiguous_vat_mode_codes.clone())
    }

    /// True if `code` means the order was rejected because of its mode.
    #[must_use]
    pub fn should_flip(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    /// True if a submission in `mode` and `state` that failed with `error`
    /// should be retried in the opposite mode.
    ///
    /// Only inc-VAT orders in the `Normal` state are retried.
    #[must_use]
    pub fn should_retry(&self, mode: PriceMode, state: SubmissionState, error: &AppError) -> bool {
        mode == PriceMode::IncVat
            && !state.is_flipped()
            && error.backend_code().is_some_and(|code| self.should_flip(code))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&PricingConfig::default())
    }
}

/// Normalizes and submits an order, retrying once with the mode flipped.
///
/// `submit` is the caller's transport; it is called at most twice. The
/// second call only happens when the first order was sent inc VAT and the
/// backend answered with one of the configured ambiguous-mode codes. A
/// failure of the second call is returned as is.
///
/// # Errors
///
/// Returns the normalization error converted into `AppError`, or the error
/// returned by the last `submit` call.
pub fn submit_with_mode_retry<T, F>(
    order: &OrderInput,
    config: &PricingConfig,
    mut submit: F,
) -> Result<T, AppError>
where
    F: FnMut(&CanonicalOrder) -> Result<T, AppError>,
{
    let policy = RetryPolicy::from_config(config);
    let state = SubmissionState::Normal;

    let canonical = PricingService::canonicalize(order, config)?;
    match submit(&canonical) {
        Err(err) if policy.should_retry(canonical.mode, state, &err) => {
            let (state, mode) = state.flip(canonical.mode)?;
            tracing::warn!(
                code = err.backend_code().unwrap_or_default(),
                from = ?canonical.mode,
                to = ?mode,
                ?state,
                "Backend rejected VAT mode, resubmitting with flipped mode"
            );
            let flipped = PricingService::canonicalize_with_mode(order, config, Some(mode))?;
            submit(&flipped)
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::types::{OrderLine, PriceSpec};
    use rust_decimal_macros::dec;

    fn inc_vat_order() -> OrderInput {
        OrderInput::new().with_line(OrderLine::order_row(
            PriceSpec::inc_vat(dec!(72), dec!(20)),
            dec!(1),
        ))
    }

    fn ex_vat_order() -> OrderInput {
        OrderInput::new().with_line(OrderLine::order_row(
            PriceSpec::ex_vat(dec!(60), dec!(20)),
            dec!(1),
        ))
    }

    fn ambiguous() -> AppError {
        AppError::backend("50036", "Order rejected: PriceIncludingVat")
    }

    #[test]
    fn test_state_flips_once() {
        let (state, mode) = SubmissionState::Normal.flip(PriceMode::IncVat).unwrap();
        assert_eq!(state, SubmissionState::Flipped);
        assert_eq!(mode, PriceMode::ExVat);
        assert_eq!(
            state.flip(mode).unwrap_err(),
            PricingError::ModeAlreadyFlipped
        );
    }

    #[test]
    fn test_policy_codes() {
        let policy = RetryPolicy::default();
        assert!(policy.should_flip("50036"));
        assert!(!policy.should_flip("40001"));

        assert!(policy.should_retry(PriceMode::IncVat, SubmissionState::Normal, &ambiguous()));
        assert!(!policy.should_retry(PriceMode::ExVat, SubmissionState::Normal, &ambiguous()));
        assert!(!policy.should_retry(PriceMode::IncVat, SubmissionState::Flipped, &ambiguous()));
        assert!(!policy.should_retry(
            PriceMode::IncVat,
            SubmissionState::Normal,
            &AppError::Internal("timeout".to_string())
        ));
    }

    #[test]
    fn test_success_on_first_attempt() {
        let mut calls = 0;
        let result = submit_with_mode_retry(&inc_vat_order(), &PricingConfig::default(), |c| {
            calls += 1;
            Ok(c.mode)
        });
        assert_eq!(result.unwrap(), PriceMode::IncVat);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_retries_inc_vat_order_once_in_ex_vat() {
        let mut seen = Vec::new();
        let result = submit_with_mode_retry(&inc_vat_order(), &PricingConfig::default(), |c| {
            seen.push((c.mode, c.forced, c.rows[0].price_per_unit));
            if c.mode == PriceMode::IncVat {
                Err(ambiguous())
            } else {
                Ok("accepted")
            }
        });
        assert_eq!(result.unwrap(), "accepted");
        assert_eq!(
            seen,
            vec![
                (PriceMode::IncVat, false, dec!(72)),
                (PriceMode::ExVat, true, dec!(60.00)),
            ]
        );
    }

    #[test]
    fn test_second_failure_propagates() {
        let mut calls = 0;
        let result: Result<(), _> =
            submit_with_mode_retry(&inc_vat_order(), &PricingConfig::default(), |_| {
                calls += 1;
                Err(ambiguous())
            });
        assert_eq!(result.unwrap_err().backend_code(), Some("50036"));
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_ex_vat_order_is_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> =
            submit_with_mode_retry(&ex_vat_order(), &PricingConfig::default(), |_| {
                calls += 1;
                Err(ambiguous())
            });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_other_codes_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> =
            submit_with_mode_retry(&inc_vat_order(), &PricingConfig::default(), |_| {
                calls += 1;
                Err(AppError::backend("40001", "Customer not found"))
            });
        assert_eq!(result.unwrap_err().backend_code(), Some("40001"));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_invalid_order_never_submitted() {
        let order = OrderInput::new().with_line(OrderLine::order_row(
            PriceSpec::default(),
            dec!(1),
        ));
        let mut calls = 0;
        let result = submit_with_mode_retry(&order, &PricingConfig::default(), |_| {
            calls += 1;
            Ok(())
        });
        assert_eq!(result.unwrap_err().error_code(), "VALIDATION_ERROR");
        assert_eq!(calls, 0);
    }
}
