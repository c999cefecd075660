//! Reporting periods
//!
//! A period is a calendar month of a given year; resolving it yields the
//! closed local date-time interval the record fetch is filtered by.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use super::error::ReportError;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Closed interval `[start, end]` of local date-times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A (month, year) selection.
///
/// Only constructible through [`ReportPeriod::new`], so every value names a
/// real month of a four-digit year and resolution cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ReportPeriod {
    /// Zero-based month index (0 = January)
    month: u32,
    year: i32,
}

impl ReportPeriod {
    pub fn new(month: u32, year: i32) -> Result<Self, ReportError> {
        if month > 11 || !(1..=9999).contains(&year) {
            return Err(ReportError::InvalidPeriod { month, year });
        }
        Ok(Self { month, year })
    }

    /// Period containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            month: date.month0(),
            year: date.year(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.month as usize]
    }

    /// "June 2024"
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }

    fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Midnight on day 1 through 23:59:59 on the last day of the month.
    ///
    /// The end is taken as one second before the first instant of the
    /// following month, so month length and leap years need no table.
    pub fn resolve(&self) -> DateRange {
        let first = self.first_day();
        let next_month = first + Months::new(1);

        DateRange {
            start: first.and_time(NaiveTime::MIN),
            end: next_month.and_time(NaiveTime::MIN) - Duration::seconds(1),
        }
    }
}

/// Years offered for selection: two either side of the current one
pub fn year_options(today: NaiveDate) -> Vec<i32> {
    let current = today.year();
    (current - 2..=current + 2).collect()
}
