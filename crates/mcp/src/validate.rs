//! Argument validation shared by the tools.
//!
//! Everything here runs before the throttle and before any request.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;

/// Upper bound for `hours`, one full day.
pub const MAX_HOURS: f64 = 24.0;

/// Upper bound for `notes`, in characters.
pub const MAX_NOTES_LEN: usize = 2000;

/// Pattern advertised in the input schemas for `spent_date`.
pub const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(DATE_PATTERN).expect("date regex"));

/// Tool arguments failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid arguments for {tool}: {reason}")]
pub struct InvalidArguments {
    pub tool: &'static str,
    pub reason: String,
}

impl InvalidArguments {
    pub fn new(tool: &'static str, reason: impl Into<String>) -> Self {
        Self {
            tool,
            reason: reason.into(),
        }
    }
}

/// Deserialize tool arguments. A missing or null argument object counts as `{}`.
pub fn parse_args<T: DeserializeOwned>(
    tool: &'static str,
    arguments: serde_json::Value,
) -> Result<T, InvalidArguments> {
    let arguments = if arguments.is_null() {
        serde_json::json!({})
    } else {
        arguments
    };
    serde_json::from_value(arguments).map_err(|e| InvalidArguments::new(tool, e.to_string()))
}

/// A positive integer identifier.
pub fn positive_id(tool: &'static str, field: &str, value: i64) -> Result<u64, InvalidArguments> {
    if value <= 0 {
        return Err(InvalidArguments::new(
            tool,
            format!("{} must be a positive integer, got {}", field, value),
        ));
    }
    Ok(value as u64)
}

/// Hours between 0 and 24 inclusive.
pub fn hours(tool: &'static str, value: f64) -> Result<f64, InvalidArguments> {
    if !value.is_finite() || !(0.0..=MAX_HOURS).contains(&value) {
        return Err(InvalidArguments::new(
            tool,
            format!("hours must be between 0 and {}, got {}", MAX_HOURS, value),
        ));
    }
    Ok(value)
}

/// A `YYYY-MM-DD` calendar date.
pub fn spent_date(tool: &'static str, value: &str) -> Result<NaiveDate, InvalidArguments> {
    if !DATE_RE.is_match(value) {
        return Err(InvalidArguments::new(
            tool,
            format!("spent_date must be formatted YYYY-MM-DD, got {:?}", value),
        ));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        InvalidArguments::new(tool, format!("spent_date {:?} is not a calendar date", value))
    })
}

/// Notes no longer than [`MAX_NOTES_LEN`] characters.
pub fn notes(tool: &'static str, value: String) -> Result<String, InvalidArguments> {
    let len = value.chars().count();
    if len > MAX_NOTES_LEN {
        return Err(InvalidArguments::new(
            tool,
            format!("notes must be at most {} characters, got {}", MAX_NOTES_LEN, len),
        ));
    }
    Ok(value)
}
