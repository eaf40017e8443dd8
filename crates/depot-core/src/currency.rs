//! # Currency Conversion
//!
//! Fixed-rate conversion between the back-office currencies.
//!
//! Rates are display-grade: they let a form pre-fill "≈ 1 000 Kč" next to a
//! EUR price. They are NOT authoritative exchange rates and nothing here
//! fetches live quotes. The host decides when to convert (on blur, on save)
//! and passes the table in explicitly.
//!
//! ## Pivot Through EUR
//! ```text
//!   amount(from) × eur_per_unit(from) = amount(EUR)
//!   amount(EUR)  ÷ eur_per_unit(to)   = amount(to)
//!
//!   100 EUR → CZK:  100 × 1.0 ÷ 0.04 = 2 500 CZK   (25 CZK = 1 EUR)
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Currency;

/// EUR value of one unit of each currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    eur_per_unit: BTreeMap<Currency, f64>,
}

impl RateTable {
    /// A table with only EUR; add the others with [`RateTable::set_rate`].
    pub fn eur_only() -> Self {
        let mut eur_per_unit = BTreeMap::new();
        eur_per_unit.insert(Currency::Eur, 1.0);
        RateTable { eur_per_unit }
    }

    /// Sets the EUR value of one unit of `currency`.
    ///
    /// ## Rules
    /// - Must be finite and positive
    /// - EUR itself is pinned at 1.0
    pub fn set_rate(&mut self, currency: Currency, eur_per_unit: f64) -> Result<(), ValidationError> {
        let field = format!("rates.{}", currency);
        if !eur_per_unit.is_finite() || eur_per_unit <= 0.0 {
            return Err(ValidationError::MustBePositive { field });
        }
        if currency == Currency::Eur && eur_per_unit != 1.0 {
            return Err(ValidationError::InvalidFormat {
                field,
                reason: "EUR is the pivot currency and must be 1.0".to_string(),
            });
        }
        self.eur_per_unit.insert(currency, eur_per_unit);
        Ok(())
    }

    /// EUR value of one unit of `currency`.
    pub fn rate(&self, currency: Currency) -> CoreResult<f64> {
        self.eur_per_unit
            .get(&currency)
            .copied()
            .ok_or(CoreError::MissingRate { currency })
    }

    /// Iterates `(currency, eur_per_unit)` pairs in currency order.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, f64)> + '_ {
        self.eur_per_unit.iter().map(|(c, r)| (*c, *r))
    }
}

impl Default for RateTable {
    /// The back-office's built-in rates.
    fn default() -> Self {
        let mut eur_per_unit = BTreeMap::new();
        eur_per_unit.insert(Currency::Eur, 1.0);
        eur_per_unit.insert(Currency::Czk, 0.04);
        eur_per_unit.insert(Currency::Usd, 0.92);
        eur_per_unit.insert(Currency::Cny, 0.13);
        eur_per_unit.insert(Currency::Vnd, 0.000038);
        RateTable { eur_per_unit }
    }
}

/// Converts `amount` from one currency to another, rounding to the nearest
/// minor unit.
///
/// ## Example
/// ```rust
/// use depot_core::currency::{convert, RateTable};
/// use depot_core::types::Currency;
/// use depot_core::Money;
///
/// let rates = RateTable::default();
/// let czk = convert(Money::from_minor(10_000), Currency::Eur, Currency::Czk, &rates).unwrap();
/// assert_eq!(czk.minor(), 250_000); // 100 EUR = 2 500 CZK
/// ```
pub fn convert(amount: Money, from: Currency, to: Currency, rates: &RateTable) -> CoreResult<Money> {
    if from == to {
        return Ok(amount);
    }

    let minor = amount.minor() as f64 * rates.rate(from)? / rates.rate(to)?;
    let rounded = minor.round();
    if !rounded.is_finite() || rounded.abs() > i64::MAX as f64 {
        return Err(CoreError::invariant(format!(
            "converting {} {} to {} overflows",
            amount, from, to
        )));
    }

    let converted = Money::from_minor(rounded as i64);
    debug!(%amount, %from, %to, %converted, "Converted amount");
    Ok(converted)
}

// =============================================================================
// Unit Tests
// =============================================================================
