//! Lenient parsing of values typed into the inventory forms.
//!
//! The frontend sends numbers sometimes as JSON numbers and sometimes as the
//! raw text of an input box, and dates as `YYYY-MM-DD`, a full ISO timestamp
//! or an empty string. Everything here turns those into typed values once,
//! at the boundary, so the rest of the crate never sees text numbers.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A form field that may hold a number or the text of an input box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    /// Sent as a JSON number
    Number(f64),
    /// Sent as text, possibly empty or non-numeric
    Text(String),
    /// Any other JSON value (bool, array, object); never a number
    Other(serde_json::Value),
}

impl FormValue {
    /// Interprets the value as a finite number.
    ///
    /// Returns `None` for empty or non-numeric text, for NaN/infinity and
    /// for values that are neither numbers nor text.
    #[must_use]
    pub fn to_number(&self) -> Option<f64> {
        let n = match self {
            Self::Number(n) => *n,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
            Self::Other(_) => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Interprets the value as a serial number.
    ///
    /// Serial numbers are positive integers; `"7"`, `7` and `7.0` all
    /// normalize to `7`. Anything else means "no serial".
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn to_serial(&self) -> Option<i64> {
        if let Self::Text(text) = self {
            if let Ok(serial) = text.trim().parse::<i64>() {
                return (serial > 0).then_some(serial);
            }
        }
        let n = self.to_number()?;
        if n.fract() != 0.0 || n < 1.0 || n > i64::MAX as f64 {
            return None;
        }
        Some(n as i64)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Numeric value of an optional form field, with anything unparseable counted as zero.
#[must_use]
pub fn number_or_zero(value: Option<&FormValue>) -> f64 {
    value.and_then(FormValue::to_number).unwrap_or(0.0)
}

/// Trims a text field, mapping blank text to `None`.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a form date.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its calendar date is kept).
/// Blank text is `Ok(None)`.
///
/// # Errors
/// Returns a message naming the value when it is neither form.
pub fn parse_form_date(value: &str) -> Result<Option<NaiveDate>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| Some(dt.date_naive()))
        .map_err(|_| format!("invalid date '{value}', expected YYYY-MM-DD"))
}

/// Serde helper for optional form dates; use with `#[serde(default, deserialize_with = ...)]`.
pub fn deserialize_form_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(text) => parse_form_date(&text).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
