//!
//! Type assertions, length checks, and string-format checks.
//!
//! Format checks operate on string values only; a non-string value fails the
//! rule rather than erroring. Type assertions for `int` accept numeric
//! strings, since mapping and form inputs usually arrive as text.

use crate::checks::helpers::{arg_int, value_len, within_bounds};
use crate::checks::{Arity, CheckFn, CheckRegistry};
use crate::value::Value;
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$")
        .expect("email pattern is valid")
});

static FULL_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#][^\s]*$").expect("url pattern is valid"));

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-zA-Z][a-zA-Z0-9+.-]*://)?[^\s]+\.[^\s]+$").expect("url pattern is valid")
});

// ============================================================================
// TYPE ASSERTIONS
// ============================================================================

/// Usage: string
pub const CHECK_STRING: CheckFn = |value, _| matches!(value, Value::Str(_));

/// Integer assertion with optional inclusive bounds.
///
/// Usage: int | int:min | int:min,max
pub const CHECK_INT: CheckFn = |value, args| {
    let parsed = match value {
        Value::Int(n) => Some(*n),
        Value::Uint(n) => i64::try_from(*n).ok(),
        Value::Str(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match parsed {
        Some(n) => within_bounds(n, args),
        None => false,
    }
};

/// Usage: float
pub const CHECK_FLOAT: CheckFn = |value, _| match value {
    Value::Float(_) => true,
    Value::Str(s) => s.trim().parse::<f64>().is_ok(),
    _ => false,
};

/// Usage: bool
pub const CHECK_BOOL: CheckFn = |value, _| match value {
    Value::Bool(_) => true,
    Value::Str(s) => matches!(s.as_str(), "true" | "false" | "1" | "0"),
    _ => false,
};

/// Usage: list
pub const CHECK_LIST: CheckFn = |value, _| matches!(value, Value::List(_));

/// Usage: map
pub const CHECK_MAP: CheckFn = |value, _| matches!(value, Value::Map(_));

// ============================================================================
// LENGTH
// ============================================================================

/// Minimum length in graphemes/elements.
///
/// Usage: minLen:N
pub const CHECK_MIN_LEN: CheckFn = |value, args| {
    match (value_len(value), arg_int(args, 0)) {
        (Some(len), Some(min)) => len as i64 >= min,
        _ => false,
    }
};

/// Maximum length in graphemes/elements.
///
/// Usage: maxLen:N
pub const CHECK_MAX_LEN: CheckFn = |value, args| {
    match (value_len(value), arg_int(args, 0)) {
        (Some(len), Some(max)) => len as i64 <= max,
        _ => false,
    }
};

// ============================================================================
// STRING FORMATS
// ============================================================================

/// Usage: email
pub const CHECK_EMAIL: CheckFn = |value, _| {
    value.as_str().map(|s| EMAIL_RE.is_match(s)).unwrap_or(false)
};

/// Loose URL: an optional scheme plus a dotted host.
///
/// Usage: url
pub const CHECK_URL: CheckFn =
    |value, _| value.as_str().map(|s| URL_RE.is_match(s)).unwrap_or(false);

/// Absolute http(s) URL.
///
/// Usage: fullUrl
pub const CHECK_FULL_URL: CheckFn = |value, _| {
    value
        .as_str()
        .map(|s| FULL_URL_RE.is_match(s))
        .unwrap_or(false)
};

/// A non-empty string of ASCII digits.
///
/// Usage: str_num
pub const CHECK_STR_NUM: CheckFn = |value, _| {
    value
        .as_str()
        .map(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
};

/// Usage: alpha
pub const CHECK_ALPHA: CheckFn = |value, _| {
    value
        .as_str()
        .map(|s| !s.is_empty() && s.chars().all(char::is_alphabetic))
        .unwrap_or(false)
};

/// Usage: alphaNum
pub const CHECK_ALPHA_NUM: CheckFn = |value, _| {
    value
        .as_str()
        .map(|s| !s.is_empty() && s.chars().all(char::is_alphanumeric))
        .unwrap_or(false)
};

/// Usage: ip
pub const CHECK_IP: CheckFn = |value, _| {
    value
        .as_str()
        .map(|s| s.parse::<std::net::IpAddr>().is_ok())
        .unwrap_or(false)
};

/// Usage: ipv4
pub const CHECK_IPV4: CheckFn = |value, _| {
    value
        .as_str()
        .map(|s| s.parse::<std::net::Ipv4Addr>().is_ok())
        .unwrap_or(false)
};

/// Matches the value against the pattern given as the rule argument. An
/// invalid pattern fails the rule; it never panics.
///
/// Usage: regex:PATTERN
pub const CHECK_REGEX: CheckFn = |value, args| {
    let (Some(s), Some(pattern)) = (value.as_str(), args.first()) else {
        return false;
    };
    match Regex::new(&pattern.to_string()) {
        Ok(re) => re.is_match(s),
        Err(_) => false,
    }
};

// ============================================================================
// REGISTRATION FUNCTION
// ============================================================================

pub fn register_string_checks(registry: &mut CheckRegistry) {
    registry.register_builtin("string", CHECK_STRING, Arity::NONE);
    registry.register_builtin("int", CHECK_INT, Arity::range(0, 2));
    registry.register_builtin("float", CHECK_FLOAT, Arity::NONE);
    registry.register_builtin("bool", CHECK_BOOL, Arity::NONE);
    registry.register_builtin("list", CHECK_LIST, Arity::NONE);
    registry.register_builtin("map", CHECK_MAP, Arity::NONE);
    registry.register_builtin("minLen", CHECK_MIN_LEN, Arity::ONE);
    registry.register_builtin("maxLen", CHECK_MAX_LEN, Arity::ONE);
    registry.register_builtin("email", CHECK_EMAIL, Arity::NONE);
    registry.register_builtin("url", CHECK_URL, Arity::NONE);
    registry.register_builtin("fullUrl", CHECK_FULL_URL, Arity::NONE);
    registry.register_builtin("str_num", CHECK_STR_NUM, Arity::NONE);
    registry.register_builtin("alpha", CHECK_ALPHA, Arity::NONE);
    registry.register_builtin("alphaNum", CHECK_ALPHA_NUM, Arity::NONE);
    registry.register_builtin("ip", CHECK_IP, Arity::NONE);
    registry.register_builtin("ipv4", CHECK_IPV4, Arity::NONE);
    registry.register_builtin("regex", CHECK_REGEX, Arity::ONE);
}
