//! Lenient numeric request fields.
//!
//! Web forms post numbers either as JSON numbers or as strings (`"12"`, `" 3.5 "`).
//! Both are accepted; anything else is a validation error naming the field.

use crate::errors::{Error, Result};
use serde::Deserialize;

/// A JSON number or a string holding one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    /// Plain JSON number
    Number(f64),
    /// String to be parsed, surrounding whitespace ignored
    Text(String),
}

impl NumericInput {
    fn to_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        };
        value.filter(|value| value.is_finite())
    }
}

/// Reads a required real-valued field.
pub fn required_f64(field: &str, value: Option<&NumericInput>) -> Result<f64> {
    value
        .ok_or_else(|| Error::validation(format!("{field} is required")))?
        .to_f64()
        .ok_or_else(|| Error::validation(format!("{field} must be a number")))
}

/// Reads a required integer field, truncating any fractional part.
pub fn required_i32(field: &str, value: Option<&NumericInput>) -> Result<i32> {
    let number = required_f64(field, value)?.trunc();
    if number < f64::from(i32::MIN) || number > f64::from(i32::MAX) {
        return Err(Error::validation(format!("{field} is out of range")));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(number as i32)
}

/// Reads a required ID field.
pub fn required_id(field: &str, value: Option<&NumericInput>) -> Result<i64> {
    let number = required_f64(field, value)?.trunc();
    // Beyond 2^53 an f64 no longer holds every integer exactly.
    if number.abs() > 9_007_199_254_740_992.0 {
        return Err(Error::validation(format!("{field} is out of range")));
    }
    #[allow(clippy::cast_possible_truncation)]
    Ok(number as i64)
}
