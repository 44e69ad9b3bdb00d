//! Cell values and number parsing.
//!
//! A cell is an `Option<Value>`: `None` is the missing marker, `Some` holds
//! either a number or text. Parsing never fails loudly; text that does not
//! look like a number stays text, and locale-formatted numbers that cannot be
//! read come back as `None`.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// Renders whole numbers without a fractional part so `23990.0` prints as
/// `23990`, matching how the value was written in the source file.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Parses a finite `f64`. `NaN` and infinities are rejected even though
/// `str::parse` accepts them.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Reads a raw CSV field into a cell.
pub fn parse_cell(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(match parse_number(trimmed) {
        Some(number) => Value::Number(number),
        None => Value::Text(raw.to_string()),
    })
}

/// Reads a number written with `.` as the thousands separator (`23.990`).
/// Every period is dropped before parsing.
pub fn parse_locale_number(raw: &str) -> Option<f64> {
    let stripped: String = raw.chars().filter(|c| *c != '.').collect();
    parse_number(&stripped)
}
