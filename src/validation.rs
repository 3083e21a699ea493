//! Field level validation rules shared by the request forms.
//!
//! Each rule checks a single field and returns either the normalized value or a
//! [FieldError] naming the field. Forms run every rule before deciding, so the
//! client hears about all the problems in one response.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem,
    format_description::well_known::Rfc3339, macros::format_description,
};

/// A validation failure for a single request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The name of the field as the client sent it, e.g. "startDate".
    pub field: String,
    /// What is wrong with the field.
    pub message: String,
}

impl FieldError {
    /// Create an error for `field`.
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_owned(),
            message: message.into(),
        }
    }
}

/// Keep only the rules that failed.
pub fn collect_errors<const N: usize>(outcomes: [Option<FieldError>; N]) -> Vec<FieldError> {
    outcomes.into_iter().flatten().collect()
}

/// Date format for dates sent by clients, e.g. "2024-03-01".
const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Read a field that should be a string if it was sent at all.
///
/// JSON `null` is treated the same as a missing field.
pub fn optional_string<'a>(
    field: &str,
    value: Option<&'a Value>,
    label: &str,
) -> Result<Option<&'a str>, FieldError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(_) => Err(FieldError::new(field, format!("{label} must be a string"))),
    }
}

/// Read a field that must be a non-blank string.
pub fn required_string<'a>(
    field: &str,
    value: Option<&'a Value>,
    label: &str,
) -> Result<&'a str, FieldError> {
    match optional_string(field, value, label)? {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(FieldError::new(field, format!("{label} is required"))),
    }
}

/// Trim `text` and check its length in characters lies in `min..=max`.
pub fn trimmed_length(
    field: &str,
    text: &str,
    min: usize,
    max: usize,
    label: &str,
) -> Result<String, FieldError> {
    let trimmed = text.trim();
    let length = trimmed.chars().count();

    if (min..=max).contains(&length) {
        Ok(trimmed.to_owned())
    } else if min == 0 {
        Err(FieldError::new(
            field,
            format!("{label} cannot exceed {max} characters"),
        ))
    } else {
        Err(FieldError::new(
            field,
            format!("{label} must be between {min} and {max} characters"),
        ))
    }
}

/// Read a number in `min..=max`. Numeric strings such as "4.50" are accepted.
pub fn number_between(
    field: &str,
    value: Option<&Value>,
    min: f64,
    max: f64,
    label: &str,
) -> Result<f64, FieldError> {
    let out_of_range = || FieldError::new(field, format!("{label} must be between {min} and {max}"));

    let number = match value {
        None | Some(Value::Null) => {
            return Err(FieldError::new(field, format!("{label} is required")));
        }
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    }
    .filter(|number| number.is_finite())
    .ok_or_else(|| FieldError::new(field, format!("{label} must be a number")))?;

    if (min..=max).contains(&number) {
        Ok(number)
    } else {
        Err(out_of_range())
    }
}

/// Parse an ISO-8601 date, either a plain date or a full RFC 3339 date-time.
pub fn parse_date(field: &str, text: &str, label: &str) -> Result<Date, FieldError> {
    let text = text.trim();

    Date::parse(text, DATE_FORMAT)
        .or_else(|_| OffsetDateTime::parse(text, &Rfc3339).map(|date_time| date_time.date()))
        .map_err(|_| {
            FieldError::new(
                field,
                format!("{label} must be a valid date in YYYY-MM-DD format"),
            )
        })
}

/// Parse one of an enumerated set of values.
pub fn parse_one_of<T: FromStr>(field: &str, text: &str, message: &str) -> Result<T, FieldError> {
    text.trim()
        .parse()
        .map_err(|_| FieldError::new(field, message))
}

/// Parse a whole number in `min..=max`.
pub fn parse_integer_between(
    field: &str,
    text: &str,
    min: u64,
    max: u64,
    message: &str,
) -> Result<u64, FieldError> {
    text.trim()
        .parse::<u64>()
        .ok()
        .filter(|number| (min..=max).contains(number))
        .ok_or_else(|| FieldError::new(field, message))
}
