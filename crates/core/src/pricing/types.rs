//! Pricing domain types.
//!
//! Inputs (`PriceSpec`, `OrderLine`, `Discount`, `OrderInput`) are supplied by
//! the caller and never mutated. Outputs (`VatBucket`, `MoneyRow`,
//! `CanonicalOrder`) are derived on every normalization pass.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order-wide VAT representation of every transmitted amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceMode {
    /// Amounts are sent excluding VAT.
    ExVat,
    /// Amounts are sent including VAT.
    IncVat,
}

impl PriceMode {
    /// Returns the opposite mode.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::ExVat => Self::IncVat,
            Self::IncVat => Self::ExVat,
        }
    }

    /// Value of the backend's `PriceIncludingVat` flag for this mode.
    #[must_use]
    pub const fn price_including_vat(self) -> bool {
        matches!(self, Self::IncVat)
    }
}

/// Which two fields win when all three price fields are supplied.
///
/// The third field is recomputed from the winning pair; the supplied value
/// for it is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecPrecedence {
    /// Amount ex VAT and VAT percent win; amount inc VAT is recomputed.
    #[default]
    ExVatAndVat,
    /// Amount inc VAT and VAT percent win; amount ex VAT is recomputed.
    IncVatAndVat,
    /// Both amounts win; VAT percent is recomputed.
    ExVatAndIncVat,
}

/// Price specification of a single line: any two of three fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceSpec {
    /// Amount per unit excluding VAT.
    pub amount_ex_vat: Option<Decimal>,
    /// Amount per unit including VAT.
    pub amount_inc_vat: Option<Decimal>,
    /// VAT rate in percent (25 means 25%).
    pub vat_percent: Option<Decimal>,
}

impl PriceSpec {
    /// Price given excluding VAT with its rate.
    #[must_use]
    pub const fn ex_vat(amount: Decimal, vat_percent: Decimal) -> Self {
        Self {
            amount_ex_vat: Some(amount),
            amount_inc_vat: None,
            vat_percent: Some(vat_percent),
        }
    }

    /// Price given including VAT with its rate.
    #[must_use]
    pub const fn inc_vat(amount: Decimal, vat_percent: Decimal) -> Self {
        Self {
            amount_ex_vat: None,
            amount_inc_vat: Some(amount),
            vat_percent: Some(vat_percent),
        }
    }

    /// Price given both excluding and including VAT; the rate is derived.
    #[must_use]
    pub const fn ex_and_inc_vat(amount_ex_vat: Decimal, amount_inc_vat: Decimal) -> Self {
        Self {
            amount_ex_vat: Some(amount_ex_vat),
            amount_inc_vat: Some(amount_inc_vat),
            vat_percent: None,
        }
    }

    /// Number of fields that are set.
    #[must_use]
    pub fn field_count(&self) -> usize {
        usize::from(self.amount_ex_vat.is_some())
            + usize::from(self.amount_inc_vat.is_some())
            + usize::from(self.vat_percent.is_some())
    }

    /// True if the price is given ex VAT + rate with no inc VAT amount.
    ///
    /// Any such line forces the whole order into ex-VAT mode.
    #[must_use]
    pub const fn is_ex_vat_only(&self) -> bool {
        self.amount_ex_vat.is_some() && self.vat_percent.is_some() && self.amount_inc_vat.is_none()
    }
}

/// A price specification with all three fields known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    /// Amount excluding VAT (unrounded).
    pub amount_ex_vat: Decimal,
    /// Amount including VAT (unrounded).
    pub amount_inc_vat: Decimal,
    /// VAT rate in percent.
    pub vat_percent: Decimal,
}

impl ResolvedPrice {
    /// Returns the amount expressed in the given mode.
    #[must_use]
    pub const fn amount_in(&self, mode: PriceMode) -> Decimal {
        match mode {
            PriceMode::ExVat => self.amount_ex_vat,
            PriceMode::IncVat => self.amount_inc_vat,
        }
    }
}

/// Kind of a priced input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Product or service row; contributes to VAT buckets.
    OrderRow,
    /// Shipping fee.
    ShippingFee,
    /// Invoice fee.
    InvoiceFee,
}

impl LineKind {
    /// Returns true for fees.
    #[must_use]
    pub const fn is_fee(self) -> bool {
        matches!(self, Self::ShippingFee | Self::InvoiceFee)
    }
}

/// Opaque identity fields passed through to the output rows.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineIdentity {
    /// Article number, shipping id, or discount id.
    pub article_number: Option<String>,
    /// Short name.
    pub name: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Unit label (e.g. "st").
    pub unit: Option<String>,
}

/// An order row or fee as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Kind of line.
    pub kind: LineKind,
    /// Price per unit.
    pub price: PriceSpec,
    /// Quantity (must not be negative).
    pub quantity: Decimal,
    /// Row-level discount in percent (0..=100), applied before order discounts.
    pub discount_percent: Decimal,
    /// Identity fields.
    pub identity: LineIdentity,
}

impl OrderLine {
    fn new(kind: LineKind, price: PriceSpec, quantity: Decimal) -> Self {
        Self {
            kind,
            price,
            quantity,
            discount_percent: Decimal::ZERO,
            identity: LineIdentity::default(),
        }
    }

    /// Creates an order row.
    #[must_use]
    pub fn order_row(price: PriceSpec, quantity: Decimal) -> Self {
        Self::new(LineKind::OrderRow, price, quantity)
    }

    /// Creates a shipping fee with quantity 1.
    #[must_use]
    pub fn shipping_fee(price: PriceSpec) -> Self {
        Self::new(LineKind::ShippingFee, price, Decimal::ONE)
    }

    /// Creates an invoice fee with quantity 1.
    #[must_use]
    pub fn invoice_fee(price: PriceSpec) -> Self {
        Self::new(LineKind::InvoiceFee, price, Decimal::ONE)
    }

    /// Sets the row-level discount percent.
    #[must_use]
    pub fn with_discount_percent(mut self, percent: Decimal) -> Self {
        self.discount_percent = percent;
        self
    }

    /// Sets the article number (or shipping id for shipping fees).
    #[must_use]
    pub fn with_article_number(mut self, article_number: impl Into<String>) -> Self {
        self.identity.article_number = Some(article_number.into());
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.identity.name = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.identity.description = Some(description.into());
        self
    }

    /// Sets the unit label.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.identity.unit = Some(unit.into());
        self
    }
}

/// Percentage discount on all order rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeDiscount {
    /// Discount in percent (0..=100).
    pub percent: Decimal,
    /// Identity fields.
    pub identity: LineIdentity,
}

/// Fixed-amount discount.
///
/// With a VAT rate (given, or derivable from both amounts) it becomes a
/// single row at that rate. Without one it is split over the order's VAT
/// buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedDiscount {
    /// Discount amount excluding VAT.
    pub amount_ex_vat: Option<Decimal>,
    /// Discount amount including VAT.
    pub amount_inc_vat: Option<Decimal>,
    /// Explicit VAT rate in percent.
    pub vat_percent: Option<Decimal>,
    /// Identity fields.
    pub identity: LineIdentity,
}

impl FixedDiscount {
    /// The discount amounts as a price specification.
    #[must_use]
    pub const fn price_spec(&self) -> PriceSpec {
        PriceSpec {
            amount_ex_vat: self.amount_ex_vat,
            amount_inc_vat: self.amount_inc_vat,
            vat_percent: self.vat_percent,
        }
    }

    /// True if the VAT rate is given or derivable from both amounts.
    #[must_use]
    pub const fn has_explicit_rate(&self) -> bool {
        self.vat_percent.is_some() || (self.amount_ex_vat.is_some() && self.amount_inc_vat.is_some())
    }

    /// True if the discount is given ex VAT with no inc VAT amount, with or
    /// without a rate.
    #[must_use]
    pub const fn is_ex_vat_only(&self) -> bool {
        self.amount_ex_vat.is_some() && self.amount_inc_vat.is_none()
    }
}

/// An order-level discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Discount {
    /// Percentage of the order rows.
    Relative(RelativeDiscount),
    /// Fixed amount.
    Fixed(FixedDiscount),
}

impl Discount {
    /// Creates a relative discount.
    #[must_use]
    pub fn relative(percent: Decimal) -> Self {
        Self::Relative(RelativeDiscount {
            percent,
            identity: LineIdentity::default(),
        })
    }

    /// Creates a fixed discount given excluding VAT, split over VAT buckets.
    #[must_use]
    pub fn fixed_ex_vat(amount: Decimal) -> Self {
        Self::fixed(PriceSpec {
            amount_ex_vat: Some(amount),
            ..PriceSpec::default()
        })
    }

    /// Creates a fixed discount given including VAT, split over VAT buckets.
    #[must_use]
    pub fn fixed_inc_vat(amount: Decimal) -> Self {
        Self::fixed(PriceSpec {
            amount_inc_vat: Some(amount),
            ..PriceSpec::default()
        })
    }

    /// Creates a fixed discount from an arbitrary price specification.
    #[must_use]
    pub fn fixed(spec: PriceSpec) -> Self {
        Self::Fixed(FixedDiscount {
            amount_ex_vat: spec.amount_ex_vat,
            amount_inc_vat: spec.amount_inc_vat,
            vat_percent: spec.vat_percent,
            identity: LineIdentity::default(),
        })
    }

    /// True if the discount can only be expressed ex VAT.
    ///
    /// Like an ex-VAT-only line, such a discount forces ex-VAT mode.
    #[must_use]
    pub const fn is_ex_vat_only(&self) -> bool {
        match self {
            Self::Relative(_) => false,
            Self::Fixed(d) => d.is_ex_vat_only(),
        }
    }

    /// Returns the identity fields.
    #[must_use]
    pub const fn identity(&self) -> &LineIdentity {
        match self {
            Self::Relative(d) => &d.identity,
            Self::Fixed(d) => &d.identity,
        }
    }

    fn identity_mut(&mut self) -> &mut LineIdentity {
        match self {
            Self::Relative(d) => &mut d.identity,
            Self::Fixed(d) => &mut d.identity,
        }
    }

    /// Sets the discount id.
    #[must_use]
    pub fn with_discount_id(mut self, id: impl Into<String>) -> Self {
        self.identity_mut().article_number = Some(id.into());
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.identity_mut().name = Some(name.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.identity_mut().description = Some(description.into());
        self
    }
}

/// Everything needed to normalize one order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInput {
    /// Order rows and fees, in caller order.
    pub lines: Vec<OrderLine>,
    /// Order-level discounts, in caller order.
    pub discounts: Vec<Discount>,
    /// Tie-break for lines that set all three price fields.
    #[serde(default)]
    pub precedence: SpecPrecedence,
}

impl OrderInput {
    /// Creates an empty order.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an order row or fee.
    #[must_use]
    pub fn with_line(mut self, line: OrderLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Adds an order-level discount.
    #[must_use]
    pub fn with_discount(mut self, discount: Discount) -> Self {
        self.discounts.push(discount);
        self
    }

    /// Sets the precedence used for over-specified prices.
    #[must_use]
    pub const fn with_precedence(mut self, precedence: SpecPrecedence) -> Self {
        self.precedence = precedence;
        self
    }
}

/// Order rows sharing one VAT rate, with their aggregated totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VatBucket {
    /// VAT rate in percent.
    pub vat_percent: Decimal,
    /// Σ quantity × unit price ex VAT, after row discounts.
    pub sum_ex_vat: Decimal,
    /// Σ quantity × unit price inc VAT, after row discounts.
    pub sum_inc_vat: Decimal,
}

/// Kind of a canonical output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Product or service row.
    OrderRow,
    /// Shipping fee.
    ShippingFee,
    /// Invoice fee.
    InvoiceFee,
    /// Row derived from an order-level discount.
    Discount,
}

impl From<LineKind> for RowKind {
    fn from(kind: LineKind) -> Self {
        match kind {
            LineKind::OrderRow => Self::OrderRow,
            LineKind::ShippingFee => Self::ShippingFee,
            LineKind::InvoiceFee => Self::InvoiceFee,
        }
    }
}

/// Sign of a row amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    /// Charge (zero included).
    Positive,
    /// Credit, e.g. a discount.
    Negative,
}

/// A canonical line, ready to be placed into a wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyRow {
    /// Kind of row.
    pub kind: RowKind,
    /// Price per unit in the order's mode, rounded; negative for discounts.
    pub price_per_unit: Decimal,
    /// VAT rate in percent.
    pub vat_percent: Decimal,
    /// True if `price_per_unit` includes VAT.
    pub price_including_vat: bool,
    /// Quantity.
    pub quantity: Decimal,
    /// Row-level discount in percent.
    pub discount_percent: Decimal,
    /// Identity fields.
    pub identity: LineIdentity,
}

impl MoneyRow {
    /// Returns the sign of the price.
    #[must_use]
    pub fn sign(&self) -> Sign {
        if self.price_per_unit.is_sign_negative() && !self.price_per_unit.is_zero() {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    /// Returns the mode the price is expressed in.
    #[must_use]
    pub const fn mode(&self) -> PriceMode {
        if self.price_including_vat {
            PriceMode::IncVat
        } else {
            PriceMode::ExVat
        }
    }
}

/// Order totals computed from the finalized rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OrderTotals {
    /// Total excluding VAT.
    pub total_ex_vat: Decimal,
    /// Total VAT.
    pub total_vat: Decimal,
    /// Total including VAT.
    pub total_inc_vat: Decimal,
}

/// Result of a normalization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalOrder {
    /// Mode every row is expressed in.
    pub mode: PriceMode,
    /// True if the mode was forced by the caller rather than decided.
    pub forced: bool,
    /// Order rows, then fees, then discount rows.
    pub rows: Vec<MoneyRow>,
    /// Totals over all rows.
    pub totals: OrderTotals,
}

impl CanonicalOrder {
    /// Rows of the given kind, in output order.
    pub fn rows_of(&self, kind: RowKind) -> impl Iterator<Item = &MoneyRow> {
        self.rows.iter().filter(move |row| row.kind == kind)
    }

    /// Rows derived from order-level discounts.
    pub fn discount_rows(&self) -> impl Iterator<Item = &MoneyRow> {
        self.rows_of(RowKind::Discount)
    }
}
