//! Reusable value formatters for table columns.
//!
//! Each formatter coerces a [`Value`] to a float first and fails with
//! [`DatapageError::Format`] when that is impossible. The only exception is
//! [`format_int`], which may map a missing value to `0`.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::data::value::pad_exponent;
use crate::data::{Row, Value};
use crate::error::DatapageError;
use crate::Result;

use super::column::ValueFn;

/// A built-in number format, selectable from configuration.
///
/// Serialized with a `type` tag, e.g. `{"type": "percent", "precision": 1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NumberFormat {
    /// Truncated integer
    Int {
        #[serde(default = "default_none_to_zero")]
        none_to_zero: bool,
    },
    /// Two decimals followed by ` €`
    Euro,
    /// Ratio times 100 followed by ` %`
    Percent {
        #[serde(default = "default_precision")]
        precision: usize,
    },
}

fn default_none_to_zero() -> bool {
    true
}

fn default_precision() -> usize {
    1
}

impl NumberFormat {
    /// Integer format mapping missing values to `0`.
    pub fn int() -> Self {
        NumberFormat::Int { none_to_zero: true }
    }

    /// Euro amount format.
    pub fn euro() -> Self {
        NumberFormat::Euro
    }

    /// Percentage format with the given number of decimals.
    pub fn percent(precision: usize) -> Self {
        NumberFormat::Percent { precision }
    }

    /// Format one value.
    pub fn apply(&self, value: &Value) -> Result<String> {
        match *self {
            NumberFormat::Int { none_to_zero } => format_int(value, none_to_zero),
            NumberFormat::Euro => format_euro(value),
            NumberFormat::Percent { precision } => format_percent(value, precision),
        }
    }
}

/// Format a value as an integer, truncating toward zero.
///
/// A missing value becomes `0` when `none_to_zero` is set and is an error
/// otherwise.
pub fn format_int(value: &Value, none_to_zero: bool) -> Result<String> {
    if value.is_null() {
        if none_to_zero {
            return Ok("0".to_string());
        }
        return Err(DatapageError::Format {
            value: value.to_string(),
            target: "int",
        });
    }

    let number = value.as_f64()?;
    if !number.is_finite() {
        return Err(DatapageError::Format {
            value: value.to_string(),
            target: "int",
        });
    }

    let truncated = number.trunc();
    if truncated == 0.0 {
        return Ok("0".to_string());
    }
    Ok(format!("{:.0}", truncated))
}

/// Format a value as a Euro amount: `3` becomes `3.00 €`.
pub fn format_euro(value: &Value) -> Result<String> {
    Ok(format!("{:.2} €", value.as_f64()?))
}

/// Format a ratio as a percentage: `0.5` becomes `50.0 %` with precision 1.
pub fn format_percent(value: &Value, precision: usize) -> Result<String> {
    Ok(format!("{:.*} %", precision, value.as_f64()? * 100.0))
}

/// Build a value function applying `format` to the named field of a row.
pub fn format_factory(format: NumberFormat, field: impl Into<String>) -> ValueFn {
    let field = field.into();
    Rc::new(move |row: &Row<'_>| format.apply(row.get(&field)?))
}

/// Display a float without switching to scientific notation for
/// everyday magnitudes.
///
/// Very large and very small magnitudes still use an exponent, written with
/// an explicit sign and at least two exponent digits (`1.23457e+10`).
pub fn format_non_scientific(number: f64) -> String {
    let magnitude = number.abs();
    if number == 0.0 {
        "0.0".to_string()
    } else if !number.is_finite() {
        Value::Float(number).to_string()
    } else if magnitude >= 1e10 {
        format_exponent(number, 5)
    } else if magnitude >= 1e6 {
        format!("{:.2}", number)
    } else if magnitude >= 1.0 {
        format!("{:.4}", number)
    } else if magnitude >= 1e-3 {
        format!("{:.6}", number)
    } else {
        format_exponent(number, 5)
    }
}

fn format_exponent(number: f64, precision: usize) -> String {
    pad_exponent(format!("{:.*e}", precision, number))
}
