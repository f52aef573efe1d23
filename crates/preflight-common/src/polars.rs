//! Polars AnyValue utility functions.
//!
//! Every check reads cells through these helpers, so text, numeric and
//! missing-value semantics are decided here once.

use polars::prelude::AnyValue;

/// Cell text as it compares against list values and regex patterns.
///
/// Nulls become the empty string; whole floats lose their fraction so a
/// float column holding `1002.0` reads as `1002`.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use preflight_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Int32(42)), "42");
/// assert_eq!(any_to_string(AnyValue::Float64(1002.0)), "1002");
/// assert_eq!(any_to_string(AnyValue::String("hello")), "hello");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => b.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        other => match any_to_f64(other.clone()) {
            Some(number) => format_numeric(number),
            None => other.to_string(),
        },
    }
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use preflight_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.5), "1.5");
/// assert_eq!(format_numeric(10.0), "10");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Coerces an `AnyValue` to `f64`.
///
/// Integers and floats convert directly, strings are parsed after trimming.
/// Returns `None` for nulls, NaN, booleans and anything unparseable, which is
/// what a lenient "to numeric" coercion yields for those cells.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    let number = match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    };
    number.filter(|v| !v.is_nan())
}

/// Parses a string as `f64`, returning `None` for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Returns true when a cell holds no value.
///
/// Nulls, NaN floats and blank strings all count as missing.
pub fn is_missing(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::Float32(v) => v.is_nan(),
        AnyValue::Float64(v) => v.is_nan(),
        AnyValue::String(s) => s.trim().is_empty(),
        AnyValue::StringOwned(s) => s.trim().is_empty(),
        _ => false,
    }
}
