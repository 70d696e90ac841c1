//! Cell values of a raw dataset.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DatapageError;
use crate::Result;

/// A single cell of a [`Dataset`](super::Dataset).
///
/// Deserializes from plain JSON scalars: `null`, booleans, integers,
/// floating point numbers and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Whether this value is missing.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Coerce to a float.
    ///
    /// Integers and floats convert directly, booleans become 1/0 and text is
    /// parsed after trimming. Missing values and non-numeric text fail with
    /// [`DatapageError::Format`].
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::Int(i) => Ok(*i as f64),
            Value::Float(f) => Ok(*f),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Str(s) => s.trim().parse::<f64>().map_err(|_| DatapageError::Format {
                value: format!("{:?}", s),
                target: "float",
            }),
            Value::Null => Err(DatapageError::Format {
                value: self.to_string(),
                target: "float",
            }),
        }
    }
}

/// Rewrite a Rust exponent (`1e16`, `1.5e-7`) as `1e+16`, `1.5e-07`.
///
/// Strings without an exponent are returned unchanged.
pub(crate) fn pad_exponent(formatted: String) -> String {
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}

/// Default stringification: `1.0`, `2.5`, `1e+16`, `None`, `True`, text unchanged.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) if x.is_nan() => write!(f, "nan"),
            Value::Float(x) => write!(f, "{}", pad_exponent(format!("{:?}", x))),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}
