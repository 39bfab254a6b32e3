//! `month` parameter policy

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How the `month` parameter is checked before it becomes part of a file name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthPolicy {
    /// Only a real calendar month written as `YYYY-MM` is accepted
    #[default]
    Strict,
    /// Any value is used as-is. A missing month becomes an empty string, so
    /// the lookup is for `weekly_summary_.json`, not a file named after a
    /// placeholder such as `undefined`.
    Passthrough,
}

impl MonthPolicy {
    /// Resolve the month to interpolate, or `None` when the policy rejects it
    pub fn resolve<'a>(self, month: Option<&'a str>) -> Option<&'a str> {
        match self {
            Self::Passthrough => Some(month.unwrap_or_default()),
            Self::Strict => month.filter(|m| is_calendar_month(m)),
        }
    }
}

/// `YYYY-MM` with a four-digit year and a month in 01..=12
pub fn is_calendar_month(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 7 || bytes[4] != b'-' {
        return false;
    }
    if !bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || b.is_ascii_digit())
    {
        return false;
    }
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d").is_ok()
}
