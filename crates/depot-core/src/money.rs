//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  The REST API sends prices as JSON numbers:                             │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  OUR SOLUTION: round ONCE at the boundary, then integer minor units     │
//! │    "fixedAmount": 19.99  ──► Money(1999) ──► all math in i64            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every supported currency is carried with two decimal places (VND and CZK
//! included), matching how the back-office stores amounts.
//!
//! ## Usage
//! ```rust
//! use depot_core::money::Money;
//!
//! let price = Money::from_minor(1099); // 10.99
//! let total = price + Money::from_minor(500);
//! assert_eq!(total.minor(), 1599);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use crate::types::DiscountRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor units (hundredths of the currency).
///
/// Serializes as a decimal JSON number (`19.99`) because that is what the
/// back-office API exchanges; conversion happens exactly once in
/// [`Money::from_major`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Money(i64);

/// Error for decimal values that cannot be money (NaN, infinity, overflow).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("not a finite monetary amount: {0}")]
pub struct InvalidAmount(pub f64);

impl Money {
    /// Creates a Money value from minor units.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from a decimal major-unit amount, rounding half
    /// away from zero to the nearest minor unit.
    ///
    /// Only used at the JSON boundary.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(19.99).unwrap().minor(), 1999);
    /// assert_eq!(Money::from_major(0.005).unwrap().minor(), 1);
    /// assert!(Money::from_major(f64::NAN).is_err());
    /// ```
    pub fn from_major(amount: f64) -> Result<Self, InvalidAmount> {
        let scaled = (amount * 100.0).round();
        if !scaled.is_finite() || scaled.abs() > i64::MAX as f64 {
            return Err(InvalidAmount(amount));
        }
        Ok(Money(scaled as i64))
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the value as a decimal major-unit number (for JSON/display).
    #[inline]
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `self - other`, floored at zero.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::money::Money;
    ///
    /// let price = Money::from_minor(1000);
    /// assert_eq!(price.saturating_sub_floor_zero(Money::from_minor(1500)), Money::zero());
    /// assert_eq!(price.saturating_sub_floor_zero(Money::from_minor(400)).minor(), 600);
    /// ```
    pub fn saturating_sub_floor_zero(&self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// Returns `self + other`, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(sum) => Some(Money(sum)),
            None => None,
        }
    }

    /// The portion of this amount covered by `rate`, rounded half-up.
    ///
    /// ## Implementation
    /// Integer math in rate units: `(amount * units + FULL / 2) / FULL`.
    /// Adding half of FULL provides the rounding; it is the only rounding
    /// step between the percentage and the result.
    ///
    /// ## Example
    /// ```rust
    /// use depot_core::money::Money;
    /// use depot_core::types::DiscountRate;
    ///
    /// let price = Money::from_minor(1999);
    /// // 15% of 19.99 = 2.9985 → 3.00
    /// assert_eq!(price.portion(DiscountRate::from_bps(1500)).minor(), 300);
    /// ```
    pub fn portion(&self, rate: DiscountRate) -> Money {
        // i128 so large amounts cannot overflow the multiplication
        let full = DiscountRate::FULL as i128;
        let part = (self.0 as i128 * rate.units() as i128 + full / 2) / full;
        Money(part as i64)
    }

    /// `part / self * 100`, or 0 when this amount is not positive.
    pub fn percent_of_self(&self, part: Money) -> f64 {
        if self.0 <= 0 {
            return 0.0;
        }
        part.0 as f64 / self.0 as f64 * 100.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal, no currency symbol: the currency travels separately.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl TryFrom<f64> for Money {
    type Error = InvalidAmount;

    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        Money::from_major(amount)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> f64 {
        money.to_major()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
