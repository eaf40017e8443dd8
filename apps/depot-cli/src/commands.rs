//! # CLI Commands
//!
//! One function per depot-core operation. Each takes the raw JSON text plus
//! parsed arguments and returns a value ready to print, so the functions are
//! testable without touching the file system.
//!
//! ## Flow
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐     ┌────────┐
//! │ JSON file   │────►│ serde (records) │────►│ depot-core  │────►│ stdout │
//! └─────────────┘     └─────────────────┘     └─────────────┘     └────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use depot_core::discount::Discount;
use depot_core::{
    apply_best_discount, apply_discount, convert, generate_expense_id, generate_occurrences,
    total_in_currency, validate_discount, validate_discount_window, validate_expense, Currency,
    DiscountRecord, DiscountResult, ExpenseRecord, LineItem, Money, RecurrenceSpec,
    ValidationError,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DepotConfig;
use crate::error::{CliError, CliResult};

// =============================================================================
// Output Shapes
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<ValidationError>) -> Self {
        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validation outcome of one expense in a batch.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseValidation {
    pub expense_id: String,
    #[serde(flatten)]
    pub report: ValidationReport,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BestDiscount {
    /// `None` when no discount targets the item.
    pub discount_id: Option<String>,
    pub result: DiscountResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrences {
    pub schedule: String,
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct Amount {
    pub amount: Money,
    pub currency: Currency,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseTotal {
    pub total: Money,
    pub currency: Currency,
    pub count: usize,
}

// =============================================================================
// Discount Commands
// =============================================================================

/// Lists every problem with a discount, including its date window.
pub fn validate_discount_json(json: &str) -> CliResult<ValidationReport> {
    let record: DiscountRecord = serde_json::from_str(json)?;
    let mut errors = validate_discount(&record);
    errors.extend(validate_discount_window(&record));

    if !errors.is_empty() {
        info!(id = %record.id, count = errors.len(), "Discount is invalid");
    }
    Ok(ValidationReport::from_errors(errors))
}

pub fn apply_discount_json(json: &str, item: &LineItem) -> CliResult<DiscountResult> {
    let record: DiscountRecord = serde_json::from_str(json)?;
    Ok(apply_discount(&record, item)?)
}

/// Picks the cheapest outcome among an array of discounts.
///
/// Invalid records are skipped with a warning; an item no discount targets
/// keeps its original price. Product and category scopes only match when the
/// item carries those ids.
pub fn best_discount_json(json: &str, item: &LineItem, at: DateTime<Utc>) -> CliResult<BestDiscount> {
    let records: Vec<DiscountRecord> = serde_json::from_str(json)?;
    let discounts: Vec<Discount> = records
        .into_iter()
        .filter_map(|record| {
            let id = record.id.clone();
            match Discount::try_from(record) {
                Ok(discount) => Some(discount),
                Err(errors) => {
                    warn!(%id, %errors, "Skipping invalid discount");
                    None
                }
            }
        })
        .collect();

    let best = match apply_best_discount(&discounts, item, at) {
        Some((discount, result)) => BestDiscount {
            discount_id: Some(discount.id.clone()),
            result,
        },
        None => BestDiscount {
            discount_id: None,
            result: DiscountResult {
                final_price: item.original_price,
                discount_amount: Money::zero(),
                effective_percent: None,
                currency: item.currency,
            },
        },
    };

    debug!(candidates = discounts.len(), chosen = ?best.discount_id, "Best discount");
    Ok(best)
}

// =============================================================================
// Expense Commands
// =============================================================================

/// Occurrence dates of a recurring expense within `[from, to]`.
pub fn occurrences_json(json: &str, from: NaiveDate, to: NaiveDate) -> CliResult<Occurrences> {
    let record: ExpenseRecord = serde_json::from_str(json)?;
    let spec = RecurrenceSpec::from_expense(&record)?.ok_or_else(|| {
        CliError::Usage(format!("expense {} is not recurring", record.expense_id))
    })?;

    Ok(Occurrences {
        schedule: spec.describe(),
        dates: generate_occurrences(&spec, from, to)?,
    })
}

/// Validates every expense in an array, in input order.
pub fn validate_expenses_json(json: &str) -> CliResult<Vec<ExpenseValidation>> {
    let records: Vec<ExpenseRecord> = serde_json::from_str(json)?;
    Ok(records
        .iter()
        .map(|record| ExpenseValidation {
            expense_id: record.expense_id.clone(),
            report: ValidationReport::from_errors(validate_expense(record)),
        })
        .collect())
}

/// Totals an array of expenses in `currency` (the configured report currency
/// when `None`).
pub fn expense_total_json(
    json: &str,
    currency: Option<Currency>,
    config: &DepotConfig,
) -> CliResult<ExpenseTotal> {
    let records: Vec<ExpenseRecord> = serde_json::from_str(json)?;
    let currency = currency.unwrap_or(config.currency.report);
    let total = total_in_currency(&records, currency, &config.rate_table()?)?;

    Ok(ExpenseTotal {
        total,
        currency,
        count: records.len(),
    })
}

pub fn expense_id(date: NaiveDate, config: &DepotConfig) -> String {
    generate_expense_id(&config.expenses.id_prefix, date)
}

// =============================================================================
// Currency Commands
// =============================================================================

pub fn convert_amount(
    amount: Money,
    from: Currency,
    to: Currency,
    config: &DepotConfig,
) -> CliResult<Amount> {
    Ok(Amount {
        amount: convert(amount, from, to, &config.rate_table()?)?,
        currency: to,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use depot_core::CoreError;

    const PERCENT_OFF: &str = r#"{
        "id": "d-10",
        "name": "Ten off",
        "discountType": "percentage",
        "percentage": 10,
        "applicationScope": "all_products",
        "status": "active",
        "startDate": "2025-01-01T00:00:00Z",
        "endDate": "2025-12-31T00:00:00Z"
    }"#;

    const FIXED_PRICE: &str = r#"{
        "id": "d-fixed",
        "name": "Everything 5",
        "discountType": "fixed_amount",
        "fixedAmount": 5,
        "applicationScope": "all_products",
        "status": "active",
        "startDate": "2025-01-01T00:00:00Z",
        "endDate": "2025-12-31T00:00:00Z"
    }"#;

    const MONTHLY_RENT: &str = r#"{
        "id": "e-1",
        "expenseId": "EXP2501001",
        "vendorName": "Landlord",
        "category": "Rent",
        "amount": 1000,
        "currency": "EUR",
        "date": "2025-01-01",
        "isRecurring": true,
        "recurringType": "monthly",
        "recurringDayOfMonth": 31
    }"#;

    const SCARF_ONLY: &str = r#"{
        "id": "d-scarf",
        "name": "Scarf week",
        "discountType": "percentage",
        "percentage": 50,
        "applicationScope": "specific_product",
        "productId": "p-scarf",
        "status": "active",
        "startDate": "2025-01-01T00:00:00Z",
        "endDate": "2025-12-31T00:00:00Z"
    }"#;

    const WINTER_CATEGORY: &str = r#"{
        "id": "d-winter",
        "name": "Winter wear",
        "discountType": "percentage",
        "percentage": 30,
        "applicationScope": "specific_category",
        "categoryId": "cat-winter",
        "status": "active",
        "startDate": "2025-01-01T00:00:00Z",
        "endDate": "2025-12-31T00:00:00Z"
    }"#;

    fn priced(minor: i64) -> LineItem {
        LineItem::priced(Money::from_minor(minor), Currency::Eur)
    }

    fn june() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_validate_discount_reports_window() {
        let report = validate_discount_json(PERCENT_OFF).unwrap();
        assert!(report.valid);

        let reversed = PERCENT_OFF.replace("2025-12-31", "2024-12-31");
        let report = validate_discount_json(&reversed).unwrap();
        assert!(!report.valid);
        assert_eq!(report.errors[0].field(), "endDate");
    }

    #[test]
    fn test_apply_discount() {
        let item = LineItem::priced(Money::from_minor(2000), Currency::Czk);
        let result = apply_discount_json(PERCENT_OFF, &item).unwrap();
        assert_eq!(result.final_price.minor(), 1800);
        assert_eq!(result.currency, Currency::Czk);
    }

    #[test]
    fn test_apply_invalid_discount_fails() {
        let bad = PERCENT_OFF.replace("\"percentage\": 10", "\"percentage\": 150");
        assert!(matches!(
            apply_discount_json(&bad, &priced(2000)),
            Err(CliError::Core(CoreError::Validation(_)))
        ));
    }

    #[test]
    fn test_best_discount_picks_lowest_price_and_skips_invalid() {
        let invalid = PERCENT_OFF.replace("\"percentage\": 10", "\"percentage\": 0");
        let json = format!("[{}, {}, {}]", PERCENT_OFF, invalid, FIXED_PRICE);

        let best = best_discount_json(&json, &priced(2000), june()).unwrap();
        assert_eq!(best.discount_id.as_deref(), Some("d-fixed"));
        assert_eq!(best.result.final_price.minor(), 500);

        let best = best_discount_json(&json, &priced(400), june()).unwrap();
        assert_eq!(best.discount_id.as_deref(), Some("d-10"));
    }

    #[test]
    fn test_best_discount_without_candidates_keeps_price() {
        let later = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let json = format!("[{}]", PERCENT_OFF);
        let best = best_discount_json(&json, &priced(2000), later).unwrap();
        assert_eq!(best.discount_id, None);
        assert_eq!(best.result.final_price.minor(), 2000);
        assert!(best.result.discount_amount.is_zero());
    }

    #[test]
    fn test_best_discount_matches_product_and_category_scopes() {
        let json = format!("[{}, {}, {}]", PERCENT_OFF, SCARF_ONLY, WINTER_CATEGORY);

        // no identity: only the store-wide discount targets the item
        let best = best_discount_json(&json, &priced(2000), june()).unwrap();
        assert_eq!(best.discount_id.as_deref(), Some("d-10"));

        let scarf = priced(2000).identified(Some("p-scarf".to_string()), None);
        let best = best_discount_json(&json, &scarf, june()).unwrap();
        assert_eq!(best.discount_id.as_deref(), Some("d-scarf"));
        assert_eq!(best.result.final_price.minor(), 1000);

        let coat = priced(2000).identified(Some("p-coat".to_string()), Some("cat-winter".to_string()));
        let best = best_discount_json(&json, &coat, june()).unwrap();
        assert_eq!(best.discount_id.as_deref(), Some("d-winter"));
        assert_eq!(best.result.final_price.minor(), 1400);
    }

    #[test]
    fn test_occurrences() {
        let out = occurrences_json(MONTHLY_RENT, d(2025, 1, 1), d(2025, 3, 31)).unwrap();
        assert_eq!(out.dates, vec![d(2025, 1, 31), d(2025, 2, 28), d(2025, 3, 31)]);
        assert!(!out.schedule.is_empty());
    }

    #[test]
    fn test_occurrences_of_one_off_expense() {
        let one_off = MONTHLY_RENT.replace("\"isRecurring\": true", "\"isRecurring\": false");
        assert!(matches!(
            occurrences_json(&one_off, d(2025, 1, 1), d(2025, 3, 31)),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn test_validate_expenses() {
        let broken = MONTHLY_RENT.replace("\"amount\": 1000", "\"amount\": 0");
        let json = format!("[{}, {}]", MONTHLY_RENT, broken);
        let reports = validate_expenses_json(&json).unwrap();
        assert!(reports[0].report.valid);
        assert!(!reports[1].report.valid);
        assert_eq!(reports[1].report.errors[0].field(), "amount");

        let out = serde_json::to_value(&reports).unwrap();
        assert_eq!(out[0]["expenseId"], "EXP2501001");
        assert_eq!(out[1]["valid"], false);
        assert_eq!(out[1]["errors"][0]["field"], "amount");
    }

    #[test]
    fn test_expense_total_uses_report_currency() {
        let json = format!("[{}, {}]", MONTHLY_RENT, MONTHLY_RENT);
        let config = DepotConfig::default();
        let total = expense_total_json(&json, None, &config).unwrap();
        assert_eq!(total.currency, Currency::Czk);
        assert_eq!(total.total.minor(), 5_000_000); // 2 000 EUR = 50 000 CZK
        assert_eq!(total.count, 2);
    }

    #[test]
    fn test_convert_uses_configured_rates() {
        let mut config = DepotConfig::default();
        config.currency.rates.insert("CZK".to_string(), 0.05);
        let out = convert_amount(Money::from_minor(10_000), Currency::Eur, Currency::Czk, &config).unwrap();
        assert_eq!(out.amount.minor(), 200_000);
    }

    #[test]
    fn test_expense_id_uses_prefix() {
        let mut config = DepotConfig::default();
        config.expenses.id_prefix = "OPS".to_string();
        assert!(expense_id(d(2025, 7, 4), &config).starts_with("OPS2507"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(validate_discount_json("{"), Err(CliError::Json(_))));
    }
}
