//! Request field parsing shared by the route handlers.

use crate::errors::{Error, Result};
use chrono::{NaiveDate, NaiveTime};

/// Returns the trimmed value, or a validation error naming `field` when it is absent or blank.
pub fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::validation(format!("{field} required")))
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| Error::validation(format!("Invalid date: {value}")))
}

/// Parses `HH:MM` or `HH:MM:SS`. Blank input means no time.
pub fn parse_time(value: Option<&str>) -> Result<Option<NaiveTime>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map(Some)
        .map_err(|_| Error::validation(format!("Invalid time: {value}")))
}
