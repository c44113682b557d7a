//! Year-quarter parsing and the monthly analysis window.

use crate::error::{AnalysisError, Result};
use chrono::{Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// A calendar quarter, e.g. `2024.Q2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearQuarter {
    pub year: i32,
    pub quarter: u32,
}

impl YearQuarter {
    pub fn new(year: i32, quarter: u32) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(AnalysisError::InvalidPeriod(format!("{year}.Q{quarter}")));
        }
        Ok(Self { year, quarter })
    }

    pub fn first_month(self) -> u32 {
        (self.quarter - 1) * 3 + 1
    }

    pub fn last_month(self) -> u32 {
        self.first_month() + 2
    }

    /// The analysis window: first month of the same quarter one year earlier
    /// through the last month of this quarter.
    pub fn window(self) -> MonthRange {
        MonthRange {
            next: NaiveDate::from_ymd_opt(self.year - 1, self.first_month(), 1),
            end: NaiveDate::from_ymd_opt(self.year, self.last_month(), 1),
        }
    }
}

impl FromStr for YearQuarter {
    type Err = AnalysisError;

    /// Accepts `YYYY.Qn`, `YYYY.n`, `YYYYQn` and `YYYYn`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AnalysisError::InvalidPeriod(s.to_string());
        let trimmed = s.trim();

        let (year, rest) = trimmed
            .split_at_checked(4)
            .filter(|(y, _)| y.chars().all(|c| c.is_ascii_digit()))
            .ok_or_else(invalid)?;
        let rest = rest.strip_prefix('.').unwrap_or(rest);
        let rest = rest
            .strip_prefix('Q')
            .or_else(|| rest.strip_prefix('q'))
            .unwrap_or(rest);

        if rest.len() != 1 {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let quarter: u32 = rest.parse().map_err(|_| invalid())?;
        Self::new(year, quarter).map_err(|_| invalid())
    }
}

impl fmt::Display for YearQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.Q{}", self.year, self.quarter)
    }
}

/// Inclusive range of first-of-month dates. Clone it to iterate again.
#[derive(Debug, Clone)]
pub struct MonthRange {
    next: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl Iterator for MonthRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        if current > self.end? {
            return None;
        }
        self.next = current.checked_add_months(Months::new(1));
        Some(current)
    }
}

/// Returns the months to analyze for a year-quarter string, in order.
pub fn generate_periods(yq: &str) -> Result<Vec<NaiveDate>> {
    let target: YearQuarter = yq.parse()?;
    Ok(target.window().collect())
}

/// Formats a period the way the vendor export writes reporting months.
pub fn format_period(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Row label of a monthly table, e.g. `2024.06`.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%Y.%m").to_string()
}

/// Maps a `YYYY.MM` month label to its `YYYY.Qn` quarter label.
pub fn quarter_label(month_label: &str) -> Option<String> {
    let (year, month) = month_label.split_once('.')?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    if !(1..=12).contains(&month) {
        return None;
    }
    Some(format!("{}.Q{}", year, (month - 1) / 3 + 1))
}
