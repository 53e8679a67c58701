//! Valuation replay domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};
use crate::utils::time_utils::get_days_between;

/// Inclusive date range a replay reconstructs, one value per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReplayWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ValidationError::InvalidInput(format!(
                "replay window start {start} is after end {end}"
            ))
            .into());
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every calendar day of the window, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        get_days_between(self.start, self.end)
    }
}

/// Daily total-value series reconstructed by a replay.
///
/// `daily_returns` holds one entry per consecutive day pair:
/// `daily_returns[i - 1] = (values[i] - values[i - 1]) / values[i - 1]`, or
/// zero when the previous value is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSeries {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<Decimal>,
    pub daily_returns: Vec<Decimal>,
}

impl ValueSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_value(&self) -> Option<Decimal> {
        self.values.first().copied()
    }

    pub fn last_value(&self) -> Option<Decimal> {
        self.values.last().copied()
    }

    /// Calendar days between the first and last point.
    pub fn days_elapsed(&self) -> i64 {
        match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) => (*last - *first).num_days(),
            _ => 0,
        }
    }
}

/// Data-quality finding raised while valuing one replay day. Never fatal;
/// the affected asset is excluded from that day's total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ValuationIssue {
    /// No price at or before `date` for an asset with a positive balance.
    #[serde(rename_all = "camelCase")]
    PriceUnavailable { asset: String, date: NaiveDate },
}

/// Complete result of one replay: the series plus every gap encountered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayOutput {
    pub series: ValueSeries,
    pub issues: Vec<ValuationIssue>,
}
