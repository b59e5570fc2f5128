//! Pricing error types.
//!
//! Validation is batched: `InvalidSpecification` carries every violation
//! found in one pass over the order, in input order, so the caller sees the
//! complete list of corrections at once.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;
use vatsplit_shared::AppError;

/// Errors that can occur while normalizing an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    /// One or more lines are missing price fields or carry invalid values.
    #[error("Invalid specification:\n{}", format_violations(.violations))]
    InvalidSpecification {
        /// Every violation found, in input order.
        violations: Vec<Violation>,
    },

    /// A fixed discount without a VAT rate has no order rows to split over.
    #[error("No VAT buckets available: add order rows or give the discount a VAT rate")]
    NoVatBucketsAvailable,

    /// The VAT mode retry was requested after the mode was already flipped.
    #[error("VAT mode has already been flipped once for this order")]
    ModeAlreadyFlipped,
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl PricingError {
    /// Builds an `InvalidSpecification` from collected violations.
    ///
    /// Returns `None` if there are no violations.
    #[must_use]
    pub fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self::InvalidSpecification { violations })
        }
    }

    /// An `InvalidSpecification` for an amount that does not fit in a
    /// `Decimal` once quantities, rates or sums are applied.
    #[must_use]
    pub fn out_of_range() -> Self {
        Self::InvalidSpecification {
            violations: vec![Violation::unlocated(ViolationKind::AmountOutOfRange)],
        }
    }

    /// Returns the error code for caller-facing responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSpecification { .. } => "INVALID_SPECIFICATION",
            Self::NoVatBucketsAvailable => "NO_VAT_BUCKETS_AVAILABLE",
            Self::ModeAlreadyFlipped => "MODE_ALREADY_FLIPPED",
        }
    }

    /// Returns the violations of an `InvalidSpecification`, empty otherwise.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::InvalidSpecification { violations } => violations,
            _ => &[],
        }
    }
}

impl From<PricingError> for AppError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InvalidSpecification { .. } => Self::Validation(err.to_string()),
            PricingError::NoVatBucketsAvailable => Self::BusinessRule(err.to_string()),
            PricingError::ModeAlreadyFlipped => Self::Internal(err.to_string()),
        }
    }
}

/// What the offending input is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// An order row.
    OrderRow,
    /// A shipping fee.
    ShippingFee,
    /// An invoice fee.
    InvoiceFee,
    /// An order-level discount.
    Discount,
}

impl fmt::Display for LineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrderRow => write!(f, "order row"),
            Self::ShippingFee => write!(f, "shipping fee"),
            Self::InvoiceFee => write!(f, "invoice fee"),
            Self::Discount => write!(f, "discount"),
        }
    }
}

/// Location of an offending input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRef {
    /// What the input is.
    pub role: LineRole,
    /// Zero-based index in the caller's line (or discount) list.
    pub index: usize,
    /// Name of the input, if set.
    pub name: Option<String>,
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.role, self.index + 1)?;
        if let Some(name) = &self.name {
            write!(f, " ({name})")?;
        }
        Ok(())
    }
}

/// A single validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationKind {
    /// Fewer than two of the three price fields are set.
    #[error(
        "two of the values must be set: amount ex VAT ({}), amount inc VAT ({}) or VAT percent ({})",
        set_label(.amount_ex_vat),
        set_label(.amount_inc_vat),
        set_label(.vat_percent)
    )]
    MissingPriceFields {
        /// Whether the amount ex VAT was set.
        amount_ex_vat: bool,
        /// Whether the amount inc VAT was set.
        amount_inc_vat: bool,
        /// Whether the VAT percent was set.
        vat_percent: bool,
    },

    /// Amount ex VAT is negative.
    #[error("amount ex VAT must not be negative, got {0}")]
    NegativeAmountExVat(Decimal),

    /// Amount inc VAT is negative.
    #[error("amount inc VAT must not be negative, got {0}")]
    NegativeAmountIncVat(Decimal),

    /// VAT percent is negative, as given or as derived from both amounts.
    #[error("VAT percent must not be negative, got {0}")]
    NegativeVatPercent(Decimal),

    /// Amount ex VAT is zero while amount inc VAT is not; no rate exists.
    #[error("VAT percent cannot be derived from a zero amount ex VAT and amount inc VAT {0}")]
    UndeterminedVatPercent(Decimal),

    /// Quantity is negative.
    #[error("quantity must not be negative, got {0}")]
    NegativeQuantity(Decimal),

    /// Row discount percent is outside 0..=100.
    #[error("row discount percent must be between 0 and 100, got {0}")]
    RowDiscountOutOfRange(Decimal),

    /// Relative discount percent is outside 0..=100.
    #[error("discount percent must be between 0 and 100, got {0}")]
    DiscountPercentOutOfRange(Decimal),

    /// Fixed discount has neither an amount ex VAT nor an amount inc VAT.
    #[error("fixed discount needs an amount ex VAT or an amount inc VAT")]
    MissingDiscountAmount,

    /// A derived amount, rate or sum does not fit in a `Decimal`.
    #[error("amount is too large to calculate with")]
    AmountOutOfRange,
}

fn set_label(set: &bool) -> &'static str {
    if *set { "set" } else { "not set" }
}

/// A validation problem and where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Offending input; `None` when a specification is checked on its own.
    pub location: Option<LineRef>,
    /// The problem.
    pub kind: ViolationKind,
}

impl Violation {
    /// A violation without a location.
    #[must_use]
    pub const fn unlocated(kind: ViolationKind) -> Self {
        Self {
            location: None,
            kind,
        }
    }

    /// A violation found at `location`.
    #[must_use]
    pub const fn at(location: LineRef, kind: ViolationKind) -> Self {
        Self {
            location: Some(location),
            kind,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}
