//! # Expense Rules
//!
//! Validation of expense records, human-readable expense ids, and totals in
//! a reporting currency.
//!
//! ## Expense Id Format
//! ```text
//!   EXP 25 01 042
//!   │   │  │  └── 3-digit random suffix (000-999)
//!   │   │  └───── 2-digit month
//!   │   └──────── 2-digit year
//!   └──────────── prefix (configurable)
//! ```
//! Collisions are not checked here: the record store owns uniqueness.

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::currency::{convert, RateTable};
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::recurrence::RecurrenceSpec;
use crate::types::{Currency, ExpenseRecord};
use crate::validation::{require_positive_amount, require_text, validate_name, Collector};

/// Formats an expense id from its parts.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use depot_core::expense::format_expense_id;
///
/// let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
/// assert_eq!(format_expense_id("EXP", date, 42), "EXP2501042");
/// ```
pub fn format_expense_id(prefix: &str, date: NaiveDate, suffix: u16) -> String {
    format!(
        "{}{:02}{:02}{:03}",
        prefix,
        date.year().rem_euclid(100),
        date.month(),
        suffix % 1000
    )
}

/// Generates a new expense id for `date` with a random 3-digit suffix.
pub fn generate_expense_id(prefix: &str, date: NaiveDate) -> String {
    let suffix = (Uuid::new_v4().as_u128() % 1000) as u16;
    format_expense_id(prefix, date, suffix)
}

/// Lists every problem with an expense record. Empty means valid.
///
/// ## Rules
/// - `expenseId`, `vendorName` and `category` are required
/// - `amount` must be positive
/// - when `isRecurring`, the recurrence fields must describe a valid
///   schedule (see [`RecurrenceSpec::from_expense`])
pub fn validate_expense(record: &ExpenseRecord) -> Vec<ValidationError> {
    let mut errors = Collector::new();
    errors.take(require_text("expenseId", Some(record.expense_id.as_str())));
    errors.take(validate_name("vendorName", &record.vendor_name));
    errors.take(require_text("category", Some(record.category.as_str())));
    errors.take(require_positive_amount("amount", Some(record.amount)));

    let mut errors = errors.into_vec();
    if let Err(recurrence) = RecurrenceSpec::from_expense(record) {
        errors.extend(recurrence);
    }
    errors
}

/// Sums expense amounts converted into `target`.
///
/// Used by expense reports, which show every expense in one base currency.
///
/// ## Errors
/// [`CoreError::MissingRate`] for a currency the table lacks, and
/// [`CoreError::InvariantViolation`] when the sum leaves the `Money` range.
pub fn total_in_currency(
    expenses: &[ExpenseRecord],
    target: Currency,
    rates: &RateTable,
) -> CoreResult<Money> {
    expenses.iter().try_fold(Money::zero(), |total, expense| {
        let amount = convert(expense.amount, expense.currency, target, rates)?;
        total.checked_add(amount).ok_or_else(|| {
            CoreError::invariant(format!(
                "expense total in {} overflows at expense {}",
                target, expense.expense_id
            ))
        })
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
