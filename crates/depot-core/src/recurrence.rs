//! # Recurring Expense Schedules
//!
//! Expands a recurrence specification into concrete occurrence dates.
//!
//! ## Occurrence Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  lower = recurringStartDate ?? rangeStart                               │
//! │  upper = recurringEndDate   ?? rangeEnd                                 │
//! │                                                                         │
//! │  weekly   first weekday match on/after lower, then +interval weeks      │
//! │  monthly  lower's month + k×interval months, day clamped to month end   │
//! │  yearly   lower's year  + k×interval years,  (month, day) clamped       │
//! │                                                                         │
//! │  dates before lower are skipped; the series stops past upper            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Clamping
//! Day 31 in a 30-day month becomes the 30th, Feb 29 in a non-leap year
//! becomes Feb 28. Every occurrence is computed from the anchor and its step
//! index `k`, never from the previous occurrence, so a clamp in February does
//! not drag March to the 28th.
//!
//! ```text
//!   day 31, monthly:  Jan 31 → Feb 28 → Mar 31 → Apr 30 → May 31
//!                               ▲ clamped, not skipped
//! ```

use chrono::{Datelike, Duration, Month, NaiveDate, Weekday};
use tracing::debug;

use crate::error::{CoreError, CoreResult, ValidationError, ValidationErrors};
use crate::types::{ExpenseRecord, RecurringType};
use crate::validation::{require_count, require_in_range, validate_date_order, weekday_from_sunday_index, Collector};

// =============================================================================
// Recurrence
// =============================================================================

/// The anchor that pins each occurrence inside its period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceRule {
    Weekly { day_of_week: Weekday },
    /// `day_of_month` in 1..=31, clamped per month.
    Monthly { day_of_month: u32 },
    /// `month` in 1..=12, `day` in 1..=31, clamped per year.
    Yearly { month: u32, day: u32 },
}

/// A complete recurrence: rule, step size and optional bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSpec {
    /// Number of weeks/months/years between occurrences; at least 1.
    pub interval: u32,
    pub rule: RecurrenceRule,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl RecurrenceSpec {
    pub fn new(interval: u32, rule: RecurrenceRule) -> Self {
        RecurrenceSpec {
            interval,
            rule,
            start_date: None,
            end_date: None,
        }
    }

    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    pub fn ending(mut self, date: NaiveDate) -> Self {
        self.end_date = Some(date);
        self
    }

    /// Extracts the recurrence from an expense record.
    ///
    /// Returns `Ok(None)` for non-recurring expenses. A missing
    /// `recurringInterval` means every period.
    pub fn from_expense(record: &ExpenseRecord) -> Result<Option<Self>, ValidationErrors> {
        if !record.is_recurring {
            return Ok(None);
        }

        let mut errors = Collector::new();
        let interval = match record.recurring_interval {
            None => Some(1),
            some => errors.take(require_count("recurringInterval", some)),
        };

        let rule = match record.recurring_type {
            None => {
                errors.push(ValidationError::Required {
                    field: "recurringType".to_string(),
                });
                None
            }
            Some(RecurringType::Weekly) => errors
                .take(weekday_from_sunday_index(
                    "recurringDayOfWeek",
                    record.recurring_day_of_week,
                ))
                .map(|day_of_week| RecurrenceRule::Weekly { day_of_week }),
            Some(RecurringType::Monthly) => errors
                .take(require_in_range(
                    "recurringDayOfMonth",
                    record.recurring_day_of_month,
                    1,
                    31,
                ))
                .map(|day_of_month| RecurrenceRule::Monthly { day_of_month }),
            Some(RecurringType::Yearly) => {
                let month = errors.take(require_in_range("recurringMonth", record.recurring_month, 1, 12));
                let day = errors.take(require_in_range("recurringDay", record.recurring_day, 1, 31));
                month.zip(day).map(|(month, day)| RecurrenceRule::Yearly { month, day })
            }
            Some(RecurringType::Unknown) => {
                errors.push(ValidationError::NotAllowed {
                    field: "recurringType".to_string(),
                    allowed: RecurringType::ALLOWED.iter().map(|s| s.to_string()).collect(),
                });
                None
            }
        };

        errors.take(validate_date_order(
            "recurringEndDate",
            "recurringStartDate",
            record.recurring_start_date,
            record.recurring_end_date,
        ));

        match (interval, rule) {
            (Some(interval), Some(rule)) if errors.is_empty() => Ok(Some(RecurrenceSpec {
                interval,
                rule,
                start_date: record.recurring_start_date,
                end_date: record.recurring_end_date,
            })),
            _ => Err(ValidationErrors(errors.into_vec())),
        }
    }

    /// Fails fast on values validation should already have rejected.
    pub fn check(&self) -> CoreResult<()> {
        if self.interval < 1 {
            return Err(CoreError::invariant("recurrence interval must be at least 1"));
        }
        match self.rule {
            RecurrenceRule::Weekly { .. } => Ok(()),
            RecurrenceRule::Monthly { day_of_month } if !(1..=31).contains(&day_of_month) => Err(
                CoreError::invariant(format!("day of month {} outside 1-31", day_of_month)),
            ),
            RecurrenceRule::Monthly { .. } => Ok(()),
            RecurrenceRule::Yearly { month, .. } if !(1..=12).contains(&month) => Err(
                CoreError::invariant(format!("month {} outside 1-12", month)),
            ),
            RecurrenceRule::Yearly { day, .. } if !(1..=31).contains(&day) => Err(
                CoreError::invariant(format!("day {} outside 1-31", day)),
            ),
            RecurrenceRule::Yearly { .. } => Ok(()),
        }
    }

    /// Lazily walks the occurrences inside the effective bounds.
    ///
    /// The iterator is `Clone`, so a partially consumed walk can be restarted
    /// from a saved copy.
    pub fn occurrences(&self, range_start: NaiveDate, range_end: NaiveDate) -> CoreResult<Occurrences> {
        self.check()?;
        let lower = self.start_date.unwrap_or(range_start);
        let upper = self.end_date.unwrap_or(range_end);
        Ok(Occurrences {
            interval: self.interval,
            rule: self.rule,
            lower,
            upper,
            step: 0,
            done: upper < lower,
        })
    }

    /// The first occurrence strictly after `date`, honouring
    /// `start_date`/`end_date`.
    pub fn next_after(&self, date: NaiveDate) -> CoreResult<Option<NaiveDate>> {
        let mut walk = self.occurrences(date, NaiveDate::MAX)?;
        Ok(walk.find(|d| *d > date))
    }

    /// A short human summary, e.g. "Every 2 weeks on Monday".
    pub fn describe(&self) -> String {
        let every = |unit: &str, single: &str| {
            if self.interval == 1 {
                single.to_string()
            } else {
                format!("Every {} {}s", self.interval, unit)
            }
        };

        let summary = match self.rule {
            RecurrenceRule::Weekly { day_of_week } => {
                format!("{} on {}", every("week", "Weekly"), weekday_name(day_of_week))
            }
            RecurrenceRule::Monthly { day_of_month } => {
                format!("{} on day {}", every("month", "Monthly"), day_of_month)
            }
            RecurrenceRule::Yearly { month, day } => {
                let name = u8::try_from(month)
                    .ok()
                    .and_then(|m| Month::try_from(m).ok())
                    .map_or("?", |m| m.name());
                format!("{} on {} {}", every("year", "Yearly"), name, day)
            }
        };

        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => format!("{}, from {} until {}", summary, start, end),
            (Some(start), None) => format!("{}, from {}", summary, start),
            (None, Some(end)) => format!("{}, until {}", summary, end),
            (None, None) => summary,
        }
    }
}

/// Full English name; chrono's `Display` only gives "Mon".
fn weekday_name(day: Weekday) -> String {
    NaiveDate::from_isoywd_opt(2024, 1, day)
        .map(|date| date.format("%A").to_string())
        .unwrap_or_else(|| day.to_string())
}

// =============================================================================
// Iterator
// =============================================================================

/// Occurrence dates of one recurrence within fixed bounds, in order.
#[derive(Debug, Clone)]
pub struct Occurrences {
    interval: u32,
    rule: RecurrenceRule,
    lower: NaiveDate,
    upper: NaiveDate,
    step: u32,
    done: bool,
}

impl Occurrences {
    /// The `k`-th candidate date, before bound filtering. `None` once the
    /// calendar runs out.
    fn candidate(&self, k: u32) -> Option<NaiveDate> {
        let offset = i64::from(k).checked_mul(i64::from(self.interval))?;
        match self.rule {
            RecurrenceRule::Weekly { day_of_week } => {
                let ahead = (7 + day_of_week.num_days_from_monday() as i64
                    - self.lower.weekday().num_days_from_monday() as i64)
                    % 7;
                let first = self.lower.checked_add_signed(Duration::days(ahead))?;
                first.checked_add_signed(Duration::try_weeks(offset)?)
            }
            RecurrenceRule::Monthly { day_of_month } => {
                let anchor = i64::from(self.lower.year()) * 12 + i64::from(self.lower.month0());
                let index = anchor.checked_add(offset)?;
                let year = i32::try_from(index.div_euclid(12)).ok()?;
                let month = index.rem_euclid(12) as u32 + 1;
                clamped_date(year, month, day_of_month)
            }
            RecurrenceRule::Yearly { month, day } => {
                let year = i64::from(self.lower.year()).checked_add(offset)?;
                clamped_date(i32::try_from(year).ok()?, month, day)
            }
        }
    }
}

impl Iterator for Occurrences {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while !self.done {
            let Some(date) = self.candidate(self.step) else {
                self.done = true;
                break;
            };
            self.step += 1;

            if date > self.upper {
                self.done = true;
                break;
            }
            if date >= self.lower {
                return Some(date);
            }
        }
        None
    }
}

/// `(year, month, day)` with `day` lowered to the month's last day.
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)?))
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}

// =============================================================================
// Entry Point
// =============================================================================

/// Every occurrence of `spec` between the effective bounds, inclusive.
///
/// Deterministic: identical arguments always yield identical vectors.
///
/// ## Errors
/// [`CoreError::InvariantViolation`] for an interval of 0 or out-of-range
/// anchors. An upper bound before the lower bound is NOT an error; it
/// yields an empty vector.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use depot_core::recurrence::{generate_occurrences, RecurrenceRule, RecurrenceSpec};
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();
/// let rent = RecurrenceSpec::new(1, RecurrenceRule::Monthly { day_of_month: 31 });
///
/// let dates = generate_occurrences(&rent, d(1, 1), d(4, 30)).unwrap();
/// assert_eq!(dates, vec![d(1, 31), d(2, 28), d(3, 31), d(4, 30)]);
/// ```
pub fn generate_occurrences(
    spec: &RecurrenceSpec,
    range_start: NaiveDate,
    range_end: NaiveDate,
) -> CoreResult<Vec<NaiveDate>> {
    let dates: Vec<NaiveDate> = spec.occurrences(range_start, range_end)?.collect();
    debug!(
        rule = ?spec.rule,
        interval = spec.interval,
        count = dates.len(),
        "Generated occurrences"
    );
    Ok(dates)
}

// =============================================================================
// Unit Tests
// =============================================================================
