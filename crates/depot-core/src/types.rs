//! # Wire Types
//!
//! Records exchanged with the back-office REST API, plus the small enums they
//! are built from.
//!
//! ## Two Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  JSON from API                                                          │
//! │       │  serde (camelCase, every optional field may be absent)          │
//! │       ▼                                                                 │
//! │  DiscountRecord / ExpenseRecord      ← THIS FILE (loose, as sent)       │
//! │       │  validate + TryFrom                                             │
//! │       ▼                                                                 │
//! │  Discount / RecurrenceSpec           ← discount.rs / recurrence.rs      │
//! │  (sum types: exactly one variant's fields exist)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failing Closed
//! Enum fields whose value is decided by the front end carry an `Unknown`
//! variant (`#[serde(other)]`). A typo such as `"percentge"` therefore
//! deserializes fine and is reported by validation, instead of being
//! silently defaulted or aborting the whole parse.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// A discount percentage in fixed-point units of 10⁻⁹ percent.
///
/// Fine enough that any percentage a person types (12.345%, 0.004%) is held
/// exactly, so the only rounding a price sees is the final one to the minor
/// unit in [`Money::portion`].
///
/// ```text
///   12.5%    =  12_500_000_000 units
///   0.004%   =       4_000_000 units
///   100%     = 100_000_000_000 units (FULL)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiscountRate(u64);

impl DiscountRate {
    pub const UNITS_PER_PERCENT: u64 = 1_000_000_000;

    /// 100% in units.
    pub const FULL: u64 = 100 * Self::UNITS_PER_PERCENT;

    /// Creates a rate from basis points (1 bp = 0.01%).
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps as u64 * (Self::UNITS_PER_PERCENT / 100))
    }

    /// Creates a rate from a percentage.
    ///
    /// Callers validate the range first; out-of-range input is clamped to
    /// 0..=100%.
    pub fn from_percentage(pct: f64) -> Self {
        let units = (pct * Self::UNITS_PER_PERCENT as f64)
            .round()
            .clamp(0.0, Self::FULL as f64);
        DiscountRate(units as u64)
    }

    #[inline]
    pub const fn units(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The rate as a percentage.
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / Self::UNITS_PER_PERCENT as f64
    }
}

// =============================================================================
// Discount Enums
// =============================================================================

/// How a discount changes the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Percent off the original price.
    Percentage,
    /// `fixedAmount` is the new sale price.
    FixedAmount,
    /// Buy `buyQuantity`, get `getQuantity` free.
    #[serde(rename = "buy_x_get_y")]
    BuyXGetY,
    #[serde(other)]
    Unknown,
}

impl DiscountType {
    pub const ALLOWED: &'static [&'static str] = &["percentage", "fixed_amount", "buy_x_get_y"];
}

/// Which products a discount targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationScope {
    AllProducts,
    SpecificProduct,
    SpecificCategory,
    SelectedProducts,
    #[serde(other)]
    Unknown,
}

impl ApplicationScope {
    pub const ALLOWED: &'static [&'static str] = &[
        "all_products",
        "specific_product",
        "specific_category",
        "selected_products",
    ];
}

/// Which product a buy-X-get-Y promotion hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum GetProductType {
    SameProduct,
    DifferentProduct,
    #[serde(other)]
    Unknown,
}

impl GetProductType {
    pub const ALLOWED: &'static [&'static str] = &["same_product", "different_product"];
}

/// Lifecycle status of a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountStatus {
    #[default]
    Active,
    Inactive,
    Finished,
}

// =============================================================================
// Discount Record
// =============================================================================

/// A discount as sent by the API: one flat object, fields populated
/// according to `discountType` and `applicationScope`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountRecord {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub discount_type: DiscountType,

    /// Percent off, in (0, 100].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,

    /// New sale price (not an amount subtracted).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub fixed_amount: Option<Money>,

    /// Signed so that negative input reaches validation instead of failing
    /// deserialization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub buy_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub get_quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_product_type: Option<GetProductType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_product_id: Option<String>,

    pub application_scope: ApplicationScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_product_ids: Option<Vec<String>>,

    #[serde(default)]
    pub status: DiscountStatus,
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,
}

// =============================================================================
// Line Item / Result
// =============================================================================

/// The candidate a discount is applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[ts(as = "f64")]
    pub original_price: Money,
    #[serde(default)]
    pub currency: Currency,
}

impl LineItem {
    /// A bare price with no product identity (matches only `all_products`).
    pub fn priced(original_price: Money, currency: Currency) -> Self {
        LineItem {
            product_id: None,
            category_id: None,
            original_price,
            currency,
        }
    }

    /// Sets the identity that product and category scopes match on.
    pub fn identified(mut self, product_id: Option<String>, category_id: Option<String>) -> Self {
        self.product_id = product_id;
        self.category_id = category_id;
        self
    }
}

/// Outcome of applying one discount to one line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DiscountResult {
    #[ts(as = "f64")]
    pub final_price: Money,
    #[ts(as = "f64")]
    pub discount_amount: Money,
    /// Savings as a percentage of the original price, where meaningful.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_percent: Option<f64>,
    /// Carried through from the line item unchanged.
    pub currency: Currency,
}

// =============================================================================
// Currency
// =============================================================================

/// Currencies the back-office books expenses and prices in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    #[default]
    Eur,
    Czk,
    Vnd,
    Cny,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Czk,
        Currency::Vnd,
        Currency::Cny,
    ];

    /// ISO 4217 code.
    pub const fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Czk => "CZK",
            Currency::Vnd => "VND",
            Currency::Cny => "CNY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "currency".to_string(),
                allowed: Currency::ALL.iter().map(|c| c.code().to_string()).collect(),
            })
    }
}

// =============================================================================
// Expense Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    #[default]
    BankTransfer,
    CreditCard,
    Paypal,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

/// Recurrence period of a recurring expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RecurringType {
    Weekly,
    Monthly,
    Yearly,
    #[serde(other)]
    Unknown,
}

impl RecurringType {
    pub const ALLOWED: &'static [&'static str] = &["weekly", "monthly", "yearly"];
}

// =============================================================================
// Expense Record
// =============================================================================

/// An expense as sent by the API, with its optional recurrence fields
/// flattened in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    pub id: String,
    /// Human-readable id, e.g. `EXP2501042`.
    pub expense_id: String,
    pub vendor_name: String,
    pub category: String,
    #[ts(as = "f64")]
    pub amount: Money,
    pub currency: Currency,
    #[ts(as = "String")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub status: ExpenseStatus,

    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_type: Option<RecurringType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub recurring_interval: Option<i64>,
    /// 0 = Sunday … 6 = Saturday.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub recurring_day_of_week: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub recurring_day_of_month: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub recurring_month: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<f64>")]
    pub recurring_day: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub recurring_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub recurring_end_date: Option<NaiveDate>,
}

// =============================================================================
// Unit Tests
// =============================================================================
