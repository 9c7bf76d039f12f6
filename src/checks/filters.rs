//!
//! Built-in filters: string normalizers and type casts. A filter replaces the
//! working value; normalizers pass non-string values through untouched, while
//! a cast that cannot represent the value reports `ConvertFailed`, which the
//! pipeline records as a failed rule for the field.

use crate::checks::{Arity, FilterFn, FilterRegistry};
use crate::errors::ErrorKind;
use crate::value::Value;

// ============================================================================
// STRING NORMALIZERS
// ============================================================================

fn map_str(value: &Value, f: impl Fn(&str) -> String) -> Result<Value, ErrorKind> {
    match value {
        Value::Str(s) => Ok(Value::Str(f(s))),
        other => Ok(other.clone()),
    }
}

/// Usage: trim
pub const FILTER_TRIM: FilterFn = |value, _| map_str(value, |s| s.trim().to_string());

/// Usage: ltrim
pub const FILTER_LTRIM: FilterFn = |value, _| map_str(value, |s| s.trim_start().to_string());

/// Usage: rtrim
pub const FILTER_RTRIM: FilterFn = |value, _| map_str(value, |s| s.trim_end().to_string());

/// Usage: lower
pub const FILTER_LOWER: FilterFn = |value, _| map_str(value, |s| s.to_lowercase());

/// Usage: upper
pub const FILTER_UPPER: FilterFn = |value, _| map_str(value, |s| s.to_uppercase());

/// Uppercases the first letter of each whitespace-separated word.
///
/// Usage: title
pub const FILTER_TITLE: FilterFn = |value, _| {
    map_str(value, |s| {
        let mut out = String::with_capacity(s.len());
        let mut at_word_start = true;
        for ch in s.chars() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            at_word_start = ch.is_whitespace();
        }
        out
    })
};

// ============================================================================
// TYPE CASTS
// ============================================================================

/// Usage: int
pub const FILTER_INT: FilterFn = |value, _| {
    value
        .to_int()
        .map(Value::Int)
        .ok_or(ErrorKind::ConvertFailed)
};

/// Usage: float
pub const FILTER_FLOAT: FilterFn = |value, _| {
    value
        .to_float()
        .map(Value::Float)
        .ok_or(ErrorKind::ConvertFailed)
};

/// Usage: string
pub const FILTER_STRING: FilterFn = |value, _| Ok(Value::Str(value.to_string()));

/// Usage: bool
pub const FILTER_BOOL: FilterFn = |value, _| match value {
    Value::Bool(b) => Ok(Value::Bool(*b)),
    Value::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(Value::Bool(true)),
        "false" | "0" | "off" | "no" | "" => Ok(Value::Bool(false)),
        _ => Err(ErrorKind::ConvertFailed),
    },
    _ => Err(ErrorKind::ConvertFailed),
};

// ============================================================================
// REGISTRATION FUNCTION
// ============================================================================

pub fn register_filters(registry: &mut FilterRegistry) {
    registry.register_builtin("trim", FILTER_TRIM, Arity::NONE);
    registry.register_builtin("ltrim", FILTER_LTRIM, Arity::NONE);
    registry.register_builtin("rtrim", FILTER_RTRIM, Arity::NONE);
    registry.register_builtin("lower", FILTER_LOWER, Arity::NONE);
    registry.register_builtin("upper", FILTER_UPPER, Arity::NONE);
    registry.register_builtin("title", FILTER_TITLE, Arity::NONE);
    registry.register_builtin("int", FILTER_INT, Arity::NONE);
    registry.register_builtin("float", FILTER_FLOAT, Arity::NONE);
    registry.register_builtin("string", FILTER_STRING, Arity::NONE);
    registry.register_builtin("bool", FILTER_BOOL, Arity::NONE);
}
