//! Typed field values and their OData literal rendering

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::date::ODataDateFormat;

static GUID_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[gG][uU][iI][dD]'([A-Fa-f0-9-]+)'$").expect("guid literal pattern is valid")
});

/// A value read from a record field, ready to be rendered for the wire
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Null/empty value, never valid when rendering
    #[default]
    Null,
    /// String value
    String(String),
    /// Whole number
    Int(i64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Single character, rendered as a one-character string
    Char(char),
    /// Date and time
    DateTime(DateTime<Utc>),
    /// Already-rendered JSON objects of a nested record list
    List(Vec<String>),
}

/// Quoting applied to string values when rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    /// Raw text
    None,
    /// OData URL literal: `'...'` with embedded apostrophes doubled
    Single,
    /// JSON string literal
    Double,
}

impl Quote {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Quote::None => text.to_string(),
            Quote::Single => format!("'{}'", text.replace('\'', "''")),
            Quote::Double => serde_json::Value::String(text.to_string()).to_string(),
        }
    }
}

/// Why a value cannot be rendered
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderIssue {
    #[error("value is null")]
    Null,

    #[error("non-finite number {0} has no literal form")]
    NonFinite(f64),
}

impl FieldValue {
    /// Check if a string value is a `guid'...'` literal, which is never quoted
    pub fn is_guid_literal(&self) -> bool {
        matches!(self, FieldValue::String(s) if GUID_LITERAL.is_match(s))
    }

    /// Render as wire text.
    ///
    /// Strings and characters take `quote`; dates become `datetime'...'` literals
    /// through `dates`; numbers and booleans are bare; lists become a JSON array of
    /// their pre-rendered objects.
    pub fn render(&self, quote: Quote, dates: &ODataDateFormat) -> Result<String, RenderIssue> {
        match self {
            FieldValue::Null => Err(RenderIssue::Null),
            FieldValue::String(s) if self.is_guid_literal() => Ok(s.clone()),
            FieldValue::String(s) => Ok(quote.apply(s)),
            FieldValue::Int(i) => Ok(i.to_string()),
            FieldValue::Float(f) if !f.is_finite() => Err(RenderIssue::NonFinite(*f)),
            FieldValue::Float(f) => Ok(f.to_string()),
            FieldValue::Bool(b) => Ok(b.to_string()),
            FieldValue::Char(c) => Ok(quote.apply(c.encode_utf8(&mut [0; 4]))),
            FieldValue::DateTime(dt) => Ok(dates.format(dt)),
            FieldValue::List(objects) => Ok(format!("[{}]", objects.join(","))),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Null => write!(f, "(null)"),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Char(c) => write!(f, "{}", c),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            FieldValue::List(objects) => write!(f, "[{} records]", objects.len()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::String(value.clone())
    }
}

macro_rules! int_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FieldValue {
                fn from(value: $ty) -> Self {
                    FieldValue::Int(i64::from(value))
                }
            }
        )*
    };
}

int_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<f32> for FieldValue {
    // via the shortest decimal form so 0.1f32 renders as 0.1, not 0.10000000149011612
    fn from(value: f32) -> Self {
        let widened = value.to_string().parse().unwrap_or(f64::from(value));
        FieldValue::Float(widened)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<char> for FieldValue {
    fn from(value: char) -> Self {
        FieldValue::Char(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}
