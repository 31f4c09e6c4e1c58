//! Backend-neutral values and coercions.
//!
//! [`Value`] is what every backend produces for a cell and accepts for a
//! parameter. [`IntoValue`] converts Rust values into parameters, and
//! [`FromValue`] is the best-effort coercion used by the row mapper.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::ConversionError;

/// A single cell or parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// The backend's "no value" marker.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns true for the "no value" marker.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text content if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the textual rendering of the value.
    ///
    /// `Null` renders as the empty string and blobs as upper-case hex.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// Converts the value to text, keeping `Null` as `Null`.
    #[must_use]
    pub fn stringify(&self) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Text(s) => Self::Text(s.clone()),
            other => Self::Text(other.render()),
        }
    }

    /// Returns the variant name, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
            Self::Blob(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                Ok(())
            }
        }
    }
}

/// Trait for types that can be bound as statement parameters.
pub trait IntoValue {
    /// Converts the value to a [`Value`].
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &Value {
    fn into_value(self) -> Value {
        self.clone()
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! int_into_value {
    ($($ty:ty),*) => {
        $(
            impl IntoValue for $ty {
                fn into_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }
        )*
    };
}

int_into_value!(i8, i16, i32, i64, u8, u16, u32);

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(String::from(self))
    }
}

impl IntoValue for Vec<u8> {
    fn into_value(self) -> Value {
        Value::Blob(self)
    }
}

impl IntoValue for &[u8] {
    fn into_value(self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl IntoValue for NaiveDate {
    fn into_value(self) -> Value {
        Value::Text(self.format(DATE_FORMAT).to_string())
    }
}

impl IntoValue for NaiveDateTime {
    fn into_value(self) -> Value {
        Value::Text(self.format(DATETIME_FORMAT).to_string())
    }
}

impl IntoValue for DateTime<Utc> {
    fn into_value(self) -> Value {
        Value::Text(self.to_rfc3339())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Best-effort coercion from a stored value into a field type.
///
/// Implementations return the value unchanged when the variant already
/// matches, and otherwise attempt a generic conversion (parsing text,
/// widening integers, narrowing integral floats). A conversion that is not
/// representable returns a [`ConversionError`].
pub trait FromValue: Sized {
    /// Coerces `value` into `Self`.
    fn from_value(value: &Value) -> Result<Self, ConversionError>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.render())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Int(n) => Ok(*n),
            Value::Bool(b) => Ok(Self::from(*b)),
            Value::Float(x) => float_to_i64(*x).ok_or_else(|| ConversionError::new(value, "i64")),
            Value::Text(s) => {
                let trimmed = s.trim();
                trimmed
                    .parse::<Self>()
                    .ok()
                    .or_else(|| trimmed.parse::<f64>().ok().and_then(float_to_i64))
                    .ok_or_else(|| ConversionError::new(value, "i64"))
            }
            Value::Null | Value::Blob(_) => Err(ConversionError::new(value, "i64")),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn float_to_i64(x: f64) -> Option<i64> {
    // i64::MAX is not exactly representable; the bound is exclusive.
    if x.is_finite() && x.fract() == 0.0 && x >= i64::MIN as f64 && x < i64::MAX as f64 {
        Some(x as i64)
    } else {
        None
    }
}

macro_rules! int_from_value {
    ($($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, ConversionError> {
                    let wide = i64::from_value(value)
                        .map_err(|_| ConversionError::new(value, stringify!($ty)))?;
                    <$ty>::try_from(wide).map_err(|_| ConversionError::new(value, stringify!($ty)))
                }
            }
        )*
    };
}

int_from_value!(i8, i16, i32, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(x) => Ok(*x),
            Value::Int(n) => Ok(*n as Self),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s
                .trim()
                .parse::<Self>()
                .map_err(|_| ConversionError::new(value, "f64")),
            Value::Null | Value::Blob(_) => Err(ConversionError::new(value, "f64")),
        }
    }
}

impl FromValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        f64::from_value(value)
            .map(|x| x as Self)
            .map_err(|_| ConversionError::new(value, "f32"))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(n) => Ok(*n != 0),
            Value::Float(x) => Ok(*x != 0.0),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(true),
                "false" | "0" | "no" => Ok(false),
                _ => Err(ConversionError::new(value, "bool")),
            },
            Value::Null | Value::Blob(_) => Err(ConversionError::new(value, "bool")),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Blob(bytes) => Ok(bytes.clone()),
            Value::Text(s) => Ok(s.as_bytes().to_vec()),
            _ => Err(ConversionError::new(value, "Vec<u8>")),
        }
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => {
                let s = s.trim();
                Self::parse_from_str(s, DATE_FORMAT)
                    .or_else(|_| NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map(|dt| dt.date()))
                    .map_err(|_| ConversionError::new(value, "NaiveDate"))
            }
            _ => Err(ConversionError::new(value, "NaiveDate")),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => parse_datetime(s.trim())
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| ConversionError::new(value, "NaiveDateTime")),
            Value::Int(secs) => DateTime::from_timestamp(*secs, 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| ConversionError::new(value, "NaiveDateTime")),
            _ => Err(ConversionError::new(value, "NaiveDateTime")),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => {
                parse_datetime(s.trim()).ok_or_else(|| ConversionError::new(value, "DateTime<Utc>"))
            }
            Value::Int(secs) => DateTime::from_timestamp(*secs, 0)
                .ok_or_else(|| ConversionError::new(value, "DateTime<Utc>")),
            _ => Err(ConversionError::new(value, "DateTime<Utc>")),
        }
    }
}

/// Parses RFC 3339 first, then the SQLite `datetime()` layouts.
fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                .map(|dt| dt.and_utc())
                .ok()
        })
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
