//! # Discount Rules
//!
//! Validates discount definitions and applies them to line items.
//!
//! ## From Record to Price
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DiscountRecord (flat JSON)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Discount::try_from  ── every problem ──►  ValidationErrors            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Discount { kind: DiscountKind, scope: DiscountScope, .. }              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  discount.apply(&line_item)  ──►  DiscountResult                        │
//! │  (infallible: a typed Discount cannot be malformed)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Pricing Rules
//! | Kind        | final price              | discount amount              |
//! |-------------|--------------------------|------------------------------|
//! | percentage  | original − amount        | original × pct / 100         |
//! | fixed price | the sale price, exactly  | max(0, original − sale)      |
//! | buy X get Y | original (unchanged)     | 0, plus a display-only rate  |
//!
//! `fixedAmount` is the NEW sale price, not an amount subtracted. A sale
//! price above the original price is accepted and yields a zero discount.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{CoreResult, ValidationError, ValidationErrors};
use crate::money::Money;
use crate::types::{
    ApplicationScope, DiscountRate, DiscountRecord, DiscountResult, DiscountStatus, DiscountType,
    GetProductType, LineItem,
};
use crate::validation::{
    present, require_count, require_ids, require_positive_amount, require_text, validate_name,
    validate_percentage, Collector,
};

// =============================================================================
// Typed Discount
// =============================================================================

/// How a discount transforms the price.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountKind {
    /// Percent off the original price.
    Percentage { rate: DiscountRate },
    /// Replaces the price with `sale_price`.
    FixedPrice { sale_price: Money },
    /// For every `buy_quantity` bought, `get_quantity` units are free.
    BuyXGetY {
        buy_quantity: u32,
        get_quantity: u32,
        reward: RewardProduct,
    },
}

/// The product handed out by a buy-X-get-Y promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewardProduct {
    SameProduct,
    DifferentProduct { product_id: String },
}

/// Which line items a discount targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountScope {
    AllProducts,
    SpecificProduct { product_id: String },
    SpecificCategory { category_id: String },
    SelectedProducts { product_ids: Vec<String> },
}

impl DiscountScope {
    /// Returns true if the scope covers `item`.
    ///
    /// Items without a product (or category) id only match `AllProducts`.
    pub fn applies_to(&self, item: &LineItem) -> bool {
        let product = present(item.product_id.as_deref());
        match self {
            DiscountScope::AllProducts => true,
            DiscountScope::SpecificProduct { product_id } => product == Some(product_id.as_str()),
            DiscountScope::SpecificCategory { category_id } => {
                present(item.category_id.as_deref()) == Some(category_id.as_str())
            }
            DiscountScope::SelectedProducts { product_ids } => {
                product.is_some_and(|p| product_ids.iter().any(|id| id == p))
            }
        }
    }
}

/// A discount whose type- and scope-specific fields are known to be
/// consistent.
#[derive(Debug, Clone, PartialEq)]
pub struct Discount {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    pub scope: DiscountScope,
    pub status: DiscountStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Discount {
    /// Applies this discount to one line item.
    ///
    /// Scope and date window are NOT checked here; see
    /// [`DiscountScope::applies_to`] and [`Discount::is_active_at`].
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::discount::{Discount, DiscountKind, DiscountScope};
    /// use depot_core::types::{Currency, DiscountRate, DiscountStatus, LineItem};
    /// use depot_core::Money;
    /// use chrono::Utc;
    ///
    /// let discount = Discount {
    ///     id: "d-1".into(),
    ///     name: "Spring".into(),
    ///     description: None,
    ///     kind: DiscountKind::Percentage { rate: DiscountRate::from_bps(2000) },
    ///     scope: DiscountScope::AllProducts,
    ///     status: DiscountStatus::Active,
    ///     start_date: Utc::now(),
    ///     end_date: Utc::now(),
    /// };
    /// let item = LineItem::priced(Money::from_minor(5000), Currency::Czk);
    /// let result = discount.apply(&item);
    /// assert_eq!(result.final_price.minor(), 4000);
    /// assert_eq!(result.discount_amount.minor(), 1000);
    /// assert_eq!(result.currency, Currency::Czk);
    /// ```
    pub fn apply(&self, item: &LineItem) -> DiscountResult {
        let original = item.original_price;

        let (final_price, discount_amount, effective_percent) = match &self.kind {
            DiscountKind::Percentage { rate } => {
                let amount = original.portion(*rate);
                (original - amount, amount, Some(rate.percentage()))
            }
            DiscountKind::FixedPrice { sale_price } => {
                let amount = original.saturating_sub_floor_zero(*sale_price);
                (*sale_price, amount, Some(original.percent_of_self(amount)))
            }
            DiscountKind::BuyXGetY {
                buy_quantity,
                get_quantity,
                ..
            } => (
                original,
                Money::zero(),
                Some(buy_x_get_y_effective_percent(*buy_quantity, *get_quantity)),
            ),
        };

        DiscountResult {
            final_price,
            discount_amount,
            effective_percent,
            currency: item.currency,
        }
    }

    /// Returns true if the discount is switched on and `at` lies inside
    /// `[start_date, end_date]`.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.status == DiscountStatus::Active && self.start_date <= at && at <= self.end_date
    }

    /// The status to display at `at`: a discount past its end date is
    /// finished whatever its stored status says.
    pub fn effective_status(&self, at: DateTime<Utc>) -> DiscountStatus {
        if at > self.end_date {
            DiscountStatus::Finished
        } else {
            self.status
        }
    }

    /// Returns true if the discount should be offered for `item` at `at`.
    pub fn applies_to(&self, item: &LineItem, at: DateTime<Utc>) -> bool {
        self.is_active_at(at) && self.scope.applies_to(item)
    }
}

/// Display-only savings rate of a buy-X-get-Y promotion, rounded to one
/// decimal place.
///
/// This assumes every bought and given unit has the same price; it is an
/// approximation for badges and reports, not a pricing rule.
///
/// ## Example
/// ```rust
/// use depot_core::discount::buy_x_get_y_effective_percent;
///
/// assert_eq!(buy_x_get_y_effective_percent(2, 1), 33.3);
/// assert_eq!(buy_x_get_y_effective_percent(1, 1), 50.0);
/// ```
pub fn buy_x_get_y_effective_percent(buy_quantity: u32, get_quantity: u32) -> f64 {
    let total = buy_quantity as f64 + get_quantity as f64;
    if total == 0.0 {
        return 0.0;
    }
    let pct = get_quantity as f64 / total * 100.0;
    (pct * 10.0).round() / 10.0
}

// =============================================================================
// Record → Discount
// =============================================================================

fn parse_kind(record: &DiscountRecord, errors: &mut Collector) -> Option<DiscountKind> {
    match record.discount_type {
        DiscountType::Percentage => errors
            .take(validate_percentage(record.percentage))
            .map(|rate| DiscountKind::Percentage { rate }),
        DiscountType::FixedAmount => errors
            .take(require_positive_amount("fixedAmount", record.fixed_amount))
            .map(|sale_price| DiscountKind::FixedPrice { sale_price }),
        DiscountType::BuyXGetY => {
            let buy_quantity = errors.take(require_count("buyQuantity", record.buy_quantity));
            let get_quantity = errors.take(require_count("getQuantity", record.get_quantity));
            let reward = parse_reward(record, errors);
            Some(DiscountKind::BuyXGetY {
                buy_quantity: buy_quantity?,
                get_quantity: get_quantity?,
                reward: reward?,
            })
        }
        DiscountType::Unknown => {
            errors.push(not_allowed("discountType", DiscountType::ALLOWED));
            None
        }
    }
}

fn parse_reward(record: &DiscountRecord, errors: &mut Collector) -> Option<RewardProduct> {
    match record.get_product_type {
        None => {
            errors.push(ValidationError::Required {
                field: "getProductType".to_string(),
            });
            None
        }
        Some(GetProductType::SameProduct) => Some(RewardProduct::SameProduct),
        Some(GetProductType::DifferentProduct) => errors
            .take(require_text("getProductId", record.get_product_id.as_deref()))
            .map(|id| RewardProduct::DifferentProduct {
                product_id: id.to_string(),
            }),
        Some(GetProductType::Unknown) => {
            errors.push(not_allowed("getProductType", GetProductType::ALLOWED));
            None
        }
    }
}

fn parse_scope(record: &DiscountRecord, errors: &mut Collector) -> Option<DiscountScope> {
    match record.application_scope {
        ApplicationScope::AllProducts => Some(DiscountScope::AllProducts),
        ApplicationScope::SpecificProduct => errors
            .take(require_text("productId", record.product_id.as_deref()))
            .map(|id| DiscountScope::SpecificProduct {
                product_id: id.to_string(),
            }),
        ApplicationScope::SpecificCategory => errors
            .take(require_text("categoryId", record.category_id.as_deref()))
            .map(|id| DiscountScope::SpecificCategory {
                category_id: id.to_string(),
            }),
        ApplicationScope::SelectedProducts => errors
            .take(require_ids(
                "selectedProductIds",
                record.selected_product_ids.as_deref(),
            ))
            .map(|product_ids| DiscountScope::SelectedProducts { product_ids }),
        ApplicationScope::Unknown => {
            errors.push(not_allowed("applicationScope", ApplicationScope::ALLOWED));
            None
        }
    }
}

fn not_allowed(field: &str, allowed: &[&str]) -> ValidationError {
    ValidationError::NotAllowed {
        field: field.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    }
}

impl TryFrom<&DiscountRecord> for Discount {
    type Error = ValidationErrors;

    fn try_from(record: &DiscountRecord) -> Result<Self, Self::Error> {
        let mut errors = Collector::new();
        let name = errors.take(validate_name("name", &record.name));
        let kind = parse_kind(record, &mut errors);
        let scope = parse_scope(record, &mut errors);

        match (name, kind, scope) {
            (Some(name), Some(kind), Some(scope)) if errors.is_empty() => Ok(Discount {
                id: record.id.clone(),
                name: name.to_string(),
                description: record.description.clone(),
                kind,
                scope,
                status: record.status,
                start_date: record.start_date,
                end_date: record.end_date,
            }),
            _ => {
                let errors = ValidationErrors(errors.into_vec());
                debug!(id = %record.id, errors = errors.len(), "Discount failed validation");
                Err(errors)
            }
        }
    }
}

impl TryFrom<DiscountRecord> for Discount {
    type Error = ValidationErrors;

    fn try_from(record: DiscountRecord) -> Result<Self, Self::Error> {
        Discount::try_from(&record)
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Lists every problem with a discount definition. Empty means valid.
///
/// ## Rules
/// - `name` is required
/// - percentage: `percentage` in (0, 100]
/// - fixed_amount: `fixedAmount` > 0
/// - buy_x_get_y: `buyQuantity` ≥ 1, `getQuantity` ≥ 1, `getProductType`
///   present, and `getProductId` when the reward is a different product
/// - scope fields per `applicationScope`
/// - unknown `discountType` / `applicationScope` values are rejected
///
/// The date window is checked separately by [`validate_discount_window`].
pub fn validate_discount(record: &DiscountRecord) -> Vec<ValidationError> {
    match Discount::try_from(record) {
        Ok(_) => Vec::new(),
        Err(errors) => errors.0,
    }
}

/// Checks that `endDate` is after `startDate`.
pub fn validate_discount_window(record: &DiscountRecord) -> Vec<ValidationError> {
    if record.end_date > record.start_date {
        Vec::new()
    } else {
        vec![ValidationError::DateOrder {
            field: "endDate".to_string(),
            other: "startDate".to_string(),
        }]
    }
}

/// Validates `record`, then applies it to `item`.
///
/// ## Errors
/// [`crate::CoreError::Validation`] listing every problem when the record is
/// malformed; nothing is applied in that case.
pub fn apply_discount(record: &DiscountRecord, item: &LineItem) -> CoreResult<DiscountResult> {
    let discount = Discount::try_from(record)?;
    let result = discount.apply(item);
    debug!(
        id = %discount.id,
        original = %item.original_price,
        final_price = %result.final_price,
        currency = %result.currency,
        "Applied discount"
    );
    Ok(result)
}

/// Picks the discount giving the lowest final price for `item` among those
/// that target it and are active at `at`. Ties keep the earlier discount.
pub fn apply_best_discount<'a>(
    discounts: &'a [Discount],
    item: &LineItem,
    at: DateTime<Utc>,
) -> Option<(&'a Discount, DiscountResult)> {
    let mut best: Option<(&'a Discount, DiscountResult)> = None;
    for discount in discounts.iter().filter(|d| d.applies_to(item, at)) {
        let result = discount.apply(item);
        let better = best
            .as_ref()
            .map_or(true, |(_, current)| result.final_price < current.final_price);
        if better {
            best = Some((discount, result));
        }
    }
    best
}

// =============================================================================
// Unit Tests
// =============================================================================
