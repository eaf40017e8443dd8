//! # Error Types
//!
//! Domain-specific error types for depot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  depot-core errors (this file)                                         │
//! │  ├── CoreError         - Invariant violations, wrapped validation      │
//! │  ├── ValidationErrors  - Aggregate of every problem in one record      │
//! │  └── ValidationError   - One field-attributed problem                  │
//! │                                                                         │
//! │  depot-cli errors (separate crate)                                     │
//! │  └── CliError          - I/O, JSON, config, wraps CoreError            │
//! │                                                                         │
//! │  Flow: ValidationError[] → ValidationErrors → CoreError → CliError     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Kinds Only
//! 1. **Validation** - user data is wrong. Always *returned* as a full list so
//!    a form can show every problem at once.
//! 2. **Invariant violation** - the caller skipped validation and handed us
//!    something impossible (e.g. a recurrence interval of 0). Fail fast.
//!
//! Nothing here is retried: these are pure computations.

use serde::Serialize;
use thiserror::Error;

use crate::types::Currency;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The record failed validation; every problem is listed.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Programmer error: an input that validation should have rejected.
    ///
    /// ## When This Occurs
    /// - `recurringInterval` of 0 reaches the scheduler
    /// - Yearly schedule with month 13
    /// - Weekly schedule with day-of-week 7
    #[error("Invariant violated: {reason}")]
    InvariantViolation { reason: String },

    /// No exchange rate is configured for a currency.
    #[error("No exchange rate configured for {currency}")]
    MissingRate { currency: Currency },
}

impl CoreError {
    /// Shorthand for building an [`CoreError::InvariantViolation`].
    pub fn invariant(reason: impl Into<String>) -> Self {
        CoreError::InvariantViolation {
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single field-attributed validation problem.
///
/// Field names use the wire (camelCase) spelling so the front end can attach
/// each message to the right input.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// A list must contain at least one entry.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Two dates are in the wrong order.
    #[error("{field} must be after {other}")]
    DateOrder { field: String, other: String },
}

impl ValidationError {
    /// The wire name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::Empty { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::DateOrder { field, .. } => field,
        }
    }
}

// =============================================================================
// Aggregate
// =============================================================================

/// Every validation problem found in one record.
///
/// Never empty when returned as an `Err`.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(transparent)]
#[error("{}", join_messages(.0))]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// Returns true if any error is attributed to `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        ValidationErrors(vec![err])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
