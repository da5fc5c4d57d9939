//! Domain error types.
//!
//! The analytics components themselves never fail on bad rows; these errors
//! cover caller mistakes when building filters and aggregators.

use chrono::NaiveDate;
use shared::period::{PeriodKey, PeriodKeyError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange { from: NaiveDate, to: NaiveDate },

    #[error("Invalid period range: {from} is after {to}")]
    InvalidPeriodRange { from: PeriodKey, to: PeriodKey },

    #[error("Invalid period: {0}")]
    InvalidPeriod(#[from] PeriodKeyError),
}
