//! Time boundaries for a history walk.
//!
//! `--since` resolves to 00:00:00 UTC of its day and is inclusive.
//! `--until` covers its whole calendar day: it resolves to 00:00:00 UTC of
//! the following day and is exclusive. Both accept `YYYY-MM-DD` or a
//! relative shorthand (`30d`, `4w`, `6m`, `1y`) counted back from today.

use chrono::{Datelike, Duration, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound (unix seconds).
    pub since: Option<i64>,
    /// Exclusive upper bound (unix seconds).
    pub until: Option<i64>,
}

impl TimeRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(since: i64, until: i64) -> Self {
        Self {
            since: Some(since),
            until: Some(until),
        }
    }

    /// Resolve the raw `--since` / `--until` values against today's UTC date.
    pub fn parse(since: Option<&str>, until: Option<&str>) -> Result<Self> {
        Self::parse_at(since, until, Utc::now().date_naive())
    }

    pub fn parse_at(since: Option<&str>, until: Option<&str>, today: NaiveDate) -> Result<Self> {
        let range = Self {
            since: since
                .map(|s| resolve_day(s, "since", today))
                .transpose()?
                .map(start_of_day),
            until: until
                .map(|s| resolve_day(s, "until", today))
                .transpose()?
                .map(|d| start_of_day(d) + SECONDS_PER_DAY),
        };
        range.validate()?;
        Ok(range)
    }

    /// Reject ranges that cannot contain any instant.
    pub fn validate(&self) -> Result<()> {
        match (self.since, self.until) {
            (Some(s), Some(u)) if s >= u => Err(Error::InvertedRange),
            _ => Ok(()),
        }
    }

    pub fn contains(&self, ts: i64) -> bool {
        self.since.is_none_or(|s| ts >= s) && self.until.is_none_or(|u| ts < u)
    }

    pub fn is_before_start(&self, ts: i64) -> bool {
        self.since.is_some_and(|s| ts < s)
    }
}

fn start_of_day(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

fn resolve_day(value: &str, flag: &'static str, today: NaiveDate) -> Result<NaiveDate> {
    if let Some(date) = parse_relative(value, today) {
        return Ok(date);
    }
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| Error::InvalidDate {
        flag,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Parse `Nd`, `Nw`, `Nm` or `Ny` into the calendar date that far before `today`.
/// Returns `None` when the value is not in relative form.
pub fn parse_relative(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() < 2 || !value.is_ascii() {
        return None;
    }
    let (num, unit) = value.split_at(value.len() - 1);
    let n: u32 = num.parse().ok()?;

    match unit {
        "d" => today.checked_sub_signed(Duration::days(i64::from(n))),
        "w" => today.checked_sub_signed(Duration::weeks(i64::from(n))),
        "m" => today.checked_sub_months(Months::new(n)),
        "y" => {
            let year = today.year().checked_sub(i32::try_from(n).ok()?)?;
            // Feb 29 falls back to Feb 28 in non-leap years.
            NaiveDate::from_ymd_opt(year, today.month(), today.day())
                .or_else(|| NaiveDate::from_ymd_opt(year, today.month(), today.day() - 1))
        }
        _ => None,
    }
}

/// Format a unix timestamp as `YYYY-MM-DD` (UTC).
pub fn format_day(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d")
        .to_string()
}

#[cfg(test)]
#[path = "range_test.rs"]
mod tests;
