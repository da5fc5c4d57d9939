//! Calendar month period keys (`YYYY-MM`).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for period key parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodKeyError {
    #[error("Invalid period format, expected YYYY-MM")]
    InvalidFormat,
    #[error("Invalid year in period")]
    InvalidYear,
    #[error("Invalid month in period")]
    InvalidMonth,
}

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Creates a key, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self, PeriodKeyError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodKeyError::InvalidMonth);
        }
        if !(0..=9999).contains(&year) {
            return Err(PeriodKeyError::InvalidYear);
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
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

    /// The following calendar month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Every month from `from` to `to`, both inclusive. Empty when `from > to`.
    pub fn range_inclusive(from: PeriodKey, to: PeriodKey) -> Vec<PeriodKey> {
        let mut keys = Vec::new();
        let mut current = from;
        while current <= to {
            keys.push(current);
            current = current.next();
        }
        keys
    }

    /// Whether `date` falls inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        Self::from_date(date) == *self
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = PeriodKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year_str, month_str) = s.trim().split_once('-').ok_or(PeriodKeyError::InvalidFormat)?;
        if year_str.len() != 4 || month_str.len() != 2 {
            return Err(PeriodKeyError::InvalidFormat);
        }

        let year: i32 = year_str.parse().map_err(|_| PeriodKeyError::InvalidYear)?;
        let month: u32 = month_str
            .parse()
            .map_err(|_| PeriodKeyError::InvalidMonth)?;

        Self::new(year, month)
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = PeriodKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}
