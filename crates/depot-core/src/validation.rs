//! # Validation Module
//!
//! Field validators shared by discount and expense validation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Front end form schema                                        │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: serde                                                        │
//! │  └── Shape and primitive types                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: THIS MODULE + discount.rs / expense.rs                       │
//! │  └── Business rules; ALL problems collected, none short-circuit        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each validator checks one field and returns the parsed value on success,
//! so record validation and typed conversion are the same code path.
//!
//! ## Usage
//! ```rust
//! use depot_core::validation::{Collector, require_text, require_count};
//!
//! let mut errors = Collector::new();
//! let name = errors.take(require_text("name", Some("Summer Sale")));
//! let buy = errors.take(require_count("buyQuantity", Some(0)));
//! assert_eq!(name, Some("Summer Sale"));
//! assert!(buy.is_none());
//! assert_eq!(errors.into_vec().len(), 1);
//! ```

use chrono::{NaiveDate, Weekday};

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::DiscountRate;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of names shown in back-office tables.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// Collector
// =============================================================================

/// Accumulates validation errors while still extracting the valid parts.
#[derive(Debug, Default)]
pub struct Collector {
    errors: Vec<ValidationError>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the value on success, records the error otherwise.
    pub fn take<T>(&mut self, result: ValidationResult<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.errors.push(err);
                None
            }
        }
    }

    pub fn push(&mut self, err: ValidationError) {
        self.errors.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }
}

// =============================================================================
// String Validators
// =============================================================================

/// Treats `None`, `""` and whitespace-only as absent.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Requires a non-blank string; returns it trimmed.
pub fn require_text<'a>(field: &str, value: Option<&'a str>) -> ValidationResult<&'a str> {
    present(value).ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })
}

/// Requires a non-blank name of at most [`MAX_NAME_LEN`] characters.
pub fn validate_name<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let name = require_text(field, Some(value))?;
    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("must be at most {} characters", MAX_NAME_LEN),
        });
    }
    Ok(name)
}

/// Requires a list with at least one non-blank id; blanks are dropped.
pub fn require_ids(field: &str, ids: Option<&[String]>) -> ValidationResult<Vec<String>> {
    let ids: Vec<String> = ids
        .unwrap_or_default()
        .iter()
        .filter_map(|id| present(Some(id.as_str())))
        .map(str::to_string)
        .collect();

    if ids.is_empty() {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }
    Ok(ids)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Requires an integer in `min..=max`. Absent counts as out of range.
pub fn require_in_range(field: &str, value: Option<i64>, min: i64, max: i64) -> ValidationResult<u32> {
    match value {
        Some(v) if (min..=max).contains(&v) => u32::try_from(v).map_err(|_| out_of_range(field, min, max)),
        _ => Err(out_of_range(field, min, max)),
    }
}

/// Requires a count of at least 1.
pub fn require_count(field: &str, value: Option<i64>) -> ValidationResult<u32> {
    match value {
        None => Err(ValidationError::Required {
            field: field.to_string(),
        }),
        Some(v) if v < 1 => Err(ValidationError::MustBePositive {
            field: field.to_string(),
        }),
        Some(v) => u32::try_from(v).map_err(|_| out_of_range(field, 1, u32::MAX as i64)),
    }
}

/// Validates a discount percentage.
///
/// ## Rules
/// - Must be present
/// - Must be greater than 0 and at most 100
///
/// ## Example
/// ```rust
/// use depot_core::validation::validate_percentage;
///
/// assert!(validate_percentage(Some(12.5)).is_ok());
/// assert!(validate_percentage(Some(100.0)).is_ok());
/// assert!(validate_percentage(Some(0.0)).is_err());
/// assert!(validate_percentage(Some(150.0)).is_err());
/// assert!(validate_percentage(None).is_err());
/// ```
pub fn validate_percentage(value: Option<f64>) -> ValidationResult<DiscountRate> {
    const FIELD: &str = "percentage";
    match value {
        None => Err(ValidationError::Required {
            field: FIELD.to_string(),
        }),
        Some(pct) if pct.is_nan() || pct <= 0.0 => Err(ValidationError::MustBePositive {
            field: FIELD.to_string(),
        }),
        Some(pct) if pct > 100.0 => Err(out_of_range(FIELD, 0, 100)),
        Some(pct) => {
            let rate = DiscountRate::from_percentage(pct);
            if rate.is_zero() {
                // below 10⁻⁹ %, nothing a price could ever show
                return Err(ValidationError::InvalidFormat {
                    field: FIELD.to_string(),
                    reason: "too small to discount anything".to_string(),
                });
            }
            Ok(rate)
        }
    }
}

/// Requires a strictly positive amount.
///
/// Amounts arrive already rounded to the minor unit, so a decimal such as
/// `0.004` reaches this check as zero and gets the "at least 0.01" error.
pub fn require_positive_amount(field: &str, value: Option<Money>) -> ValidationResult<Money> {
    match value {
        None => Err(ValidationError::Required {
            field: field.to_string(),
        }),
        Some(amount) if amount.is_zero() => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must be at least 0.01 (amounts are rounded to the minor unit)".to_string(),
        }),
        Some(amount) if amount.is_negative() => Err(ValidationError::MustBePositive {
            field: field.to_string(),
        }),
        Some(amount) => Ok(amount),
    }
}

/// Converts a Sunday-based day-of-week index (0 = Sunday) to a [`Weekday`].
pub fn weekday_from_sunday_index(field: &str, value: Option<i64>) -> ValidationResult<Weekday> {
    let day = require_in_range(field, value, 0, 6)?;
    // chrono counts from Monday
    let monday_based = ((day + 6) % 7) as u8;
    Weekday::try_from(monday_based).map_err(|_| out_of_range(field, 0, 6))
}

// =============================================================================
// Date Validators
// =============================================================================

/// Requires `end >= start` when both dates are present.
pub fn validate_date_order(
    end_field: &str,
    start_field: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> ValidationResult<()> {
    match (start, end) {
        (Some(s), Some(e)) if e < s => Err(ValidationError::DateOrder {
            field: end_field.to_string(),
            other: start_field.to_string(),
        }),
        _ => Ok(()),
    }
}

fn out_of_range(field: &str, min: i64, max: i64) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min,
        max,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_keeps_valid_parts() {
        let mut errors = Collector::new();
        assert_eq!(errors.take(require_count("buyQuantity", Some(2))), Some(2));
        assert_eq!(errors.take(require_count("getQuantity", Some(0))), None);
        errors.push(ValidationError::Required {
            field: "name".to_string(),
        });

        assert!(!errors.is_empty());
        let collected = errors.into_vec();
        let fields: Vec<&str> = collected.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["getQuantity", "name"]);
    }

    #[test]
    fn test_require_text() {
        assert_eq!(require_text("productId", Some(" p-1 ")).unwrap(), "p-1");
        assert!(require_text("productId", Some("   ")).is_err());
        assert!(require_text("productId", None).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Summer Sale").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(300)).is_err());
    }

    #[test]
    fn test_require_ids_drops_blanks() {
        let ids = vec!["p-1".to_string(), " ".to_string(), "p-2".to_string()];
        assert_eq!(require_ids("selectedProductIds", Some(ids.as_slice())).unwrap(), vec!["p-1", "p-2"]);

        let blanks = vec!["".to_string()];
        assert!(matches!(
            require_ids("selectedProductIds", Some(blanks.as_slice())),
            Err(ValidationError::Empty { .. })
        ));
        assert!(require_ids("selectedProductIds", Some(&[][..])).is_err());
        assert!(require_ids("selectedProductIds", None).is_err());
    }

    #[test]
    fn test_require_count() {
        assert_eq!(require_count("buyQuantity", Some(2)).unwrap(), 2);
        assert!(matches!(
            require_count("buyQuantity", Some(0)),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            require_count("buyQuantity", None),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_require_in_range() {
        assert_eq!(require_in_range("recurringMonth", Some(12), 1, 12).unwrap(), 12);
        assert!(require_in_range("recurringMonth", Some(13), 1, 12).is_err());
        assert!(require_in_range("recurringMonth", Some(0), 1, 12).is_err());
        assert!(require_in_range("recurringMonth", None, 1, 12).is_err());
    }

    #[test]
    fn test_validate_percentage() {
        assert_eq!(validate_percentage(Some(15.0)).unwrap(), DiscountRate::from_bps(1500));
        assert_eq!(validate_percentage(Some(0.004)).unwrap().percentage(), 0.004);
        assert!(validate_percentage(Some(1e-12)).is_err());
        assert!(validate_percentage(Some(-5.0)).is_err());
        assert!(validate_percentage(Some(f64::NAN)).is_err());
        assert!(matches!(
            validate_percentage(Some(100.5)),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_weekday_from_sunday_index() {
        assert_eq!(weekday_from_sunday_index("d", Some(0)).unwrap(), Weekday::Sun);
        assert_eq!(weekday_from_sunday_index("d", Some(1)).unwrap(), Weekday::Mon);
        assert_eq!(weekday_from_sunday_index("d", Some(6)).unwrap(), Weekday::Sat);
        assert!(weekday_from_sunday_index("d", Some(7)).is_err());
        assert!(weekday_from_sunday_index("d", Some(-1)).is_err());

        let mut expected = Weekday::Sun;
        for index in 0..7 {
            assert_eq!(weekday_from_sunday_index("d", Some(index)).unwrap(), expected);
            expected = expected.succ();
        }
    }

    #[test]
    fn test_validate_date_order() {
        let jan = NaiveDate::from_ymd_opt(2025, 1, 1);
        let feb = NaiveDate::from_ymd_opt(2025, 2, 1);
        assert!(validate_date_order("end", "start", jan, feb).is_ok());
        assert!(validate_date_order("end", "start", jan, jan).is_ok());
        assert!(validate_date_order("end", "start", feb, jan).is_err());
        assert!(validate_date_order("end", "start", None, jan).is_ok());
    }
}
