//! Calendar arithmetic on plain (zone-less) dates.
//!
//! Dates travel through the system as `YYYY-MM-DD` strings. Parsing here is
//! lenient about zero padding (`2025-3-5` is accepted) so that records written
//! by older clients still land in the right month.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid date {value:?}: expected YYYY-MM-DD")]
pub struct DateError {
    value: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid month {value:?}: expected YYYY-MM")]
pub struct MonthError {
    value: String,
}

/// Number of days (28..=31) in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> u32 {
    MonthKey::of(date).last_day().day()
}

/// Whole calendar months from `base` to `target`, using only the year and
/// month fields. Negative when `target` precedes `base`.
pub fn months_between_dates(base: NaiveDate, target: NaiveDate) -> i32 {
    (target.year() - base.year()) * 12 + (target.month() as i32 - base.month() as i32)
}

/// Month difference between two date strings.
///
/// An empty base yields 0. An unparseable base or target also yields 0 and
/// logs a warning rather than failing the caller.
pub fn months_between(base: &str, target: &str) -> i32 {
    if base.trim().is_empty() {
        return 0;
    }
    let base_date = match parse_date(base) {
        Ok(d) => d,
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring malformed base date; treating as 0 months elapsed");
            return 0;
        }
    };
    match parse_date(target) {
        Ok(target_date) => months_between_dates(base_date, target_date),
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring malformed target date; treating as 0 months elapsed");
            0
        }
    }
}

/// Render a date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse `YYYY-MM-DD`, tolerating missing zero padding and a trailing
/// time component (`2025-03-01T09:00:00`).
pub fn parse_date(value: &str) -> Result<NaiveDate, DateError> {
    let err = || DateError {
        value: value.to_string(),
    };
    let trimmed = value.trim();
    let date_part = trimmed.split(['T', ' ']).next().unwrap_or(trimmed);

    let mut parts = date_part.split('-');
    let (Some(y), Some(m), Some(d), None) = (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(err());
    };
    let year: i32 = y.parse().map_err(|_| err())?;
    let month: u32 = m.parse().map_err(|_| err())?;
    let day: u32 = d.parse().map_err(|_| err())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(err)
}

/// Serde helper: lenient `YYYY-MM-DD` deserialization.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_date(&s).map_err(de::Error::custom)
}

/// Serde helper: lenient optional date; `null` and `""` both mean absent.
pub fn deserialize_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(v).map(Some).map_err(de::Error::custom),
    }
}

/// A calendar month (year + 1-based month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).expect("month key is always valid")
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day().pred_opt().expect("valid date")
    }

    /// The 15th; stands in for "some day in this month" when checking
    /// whether a time-bounded definition is in effect.
    pub fn mid_month(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 15).expect("every month has a 15th")
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    pub fn next(&self) -> Self {
        self.offset(1)
    }

    pub fn previous(&self) -> Self {
        self.offset(-1)
    }

    /// Shift by a signed number of months.
    pub fn offset(&self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for MonthKey {
    type Err = MonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || MonthError {
            value: s.to_string(),
        };
        let (y, m) = s.trim().split_once('-').ok_or_else(err)?;
        let year: i32 = y.parse().map_err(|_| err())?;
        let month: u32 = m.parse().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}
