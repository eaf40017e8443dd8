//! # depot-core: Pure Business Logic for the Depot Back-Office
//!
//! The back-office screens (products, orders, expenses, discounts, ...) are
//! plain CRUD over a REST API. The few rules that are more than required-field
//! checks live here as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Depot Back-Office Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │          Admin UI / REST API handlers / batch jobs              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON records                           │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ depot-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌────────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ discount  │  │ recurrence │  │ currency  │  │  expense  │  │   │
//! │  │   │ validate  │  │ occurrence │  │ RateTable │  │ ids, sums │  │   │
//! │  │   │  apply    │  │   dates    │  │  convert  │  │ validate  │  │   │
//! │  │   └───────────┘  └────────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire records (DiscountRecord, ExpenseRecord, LineItem, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Validation and invariant errors
//! - [`validation`] - Field validators and the error collector
//! - [`discount`] - Discount validation and pricing
//! - [`recurrence`] - Recurring expense occurrence dates
//! - [`currency`] - Fixed-rate currency conversion
//! - [`expense`] - Expense validation, ids and totals
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, safe from any thread
//! 2. **No I/O**: config files and logging setup belong to the host
//! 3. **Integer Money**: decimals are rounded once at the JSON boundary
//! 4. **All Errors At Once**: validation returns every problem, never the first
//!
//! ## Example Usage
//!
//! ```rust
//! use depot_core::{apply_discount, validate_discount, DiscountRecord, LineItem};
//!
//! let record: DiscountRecord = serde_json::from_str(r#"{
//!     "id": "d-1",
//!     "name": "Clearance",
//!     "discountType": "percentage",
//!     "percentage": 20,
//!     "applicationScope": "all_products",
//!     "status": "active",
//!     "startDate": "2025-01-01T00:00:00Z",
//!     "endDate": "2025-12-31T23:59:59Z"
//! }"#).unwrap();
//!
//! assert!(validate_discount(&record).is_empty());
//!
//! let item: LineItem = serde_json::from_str(r#"{ "originalPrice": 49.90 }"#).unwrap();
//! let result = apply_discount(&record, &item).unwrap();
//! assert_eq!(result.final_price.minor(), 3992);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod currency;
pub mod discount;
pub mod error;
pub mod expense;
pub mod money;
pub mod recurrence;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use currency::{convert, RateTable};
pub use discount::{apply_best_discount, apply_discount, validate_discount, validate_discount_window, Discount};
pub use error::{CoreError, CoreResult, ValidationError, ValidationErrors};
pub use expense::{generate_expense_id, total_in_currency, validate_expense};
pub use money::Money;
pub use recurrence::{generate_occurrences, RecurrenceRule, RecurrenceSpec};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of human-readable expense ids (`EXP2501042`).
pub const DEFAULT_EXPENSE_ID_PREFIX: &str = "EXP";

/// Currency expense reports are totalled in unless configured otherwise.
pub const DEFAULT_REPORT_CURRENCY: Currency = Currency::Czk;
