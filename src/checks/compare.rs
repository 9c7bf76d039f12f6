//!
//! Presence, equality, ordering and membership checks. All callables here are
//! pure predicates over the working value and the rule's coerced arguments.
//!
//! ## Checks Provided
//!
//! - **Presence**: `required`
//! - **Ordering**: `min`, `max`, `gt`, `lt`
//! - **Equality**: `eq`, `ne`
//! - **Membership**: `in`, `notIn`, `in_ints`

use crate::checks::helpers::compare_numeric;
use crate::checks::{Arity, CheckFn, CheckRegistry};
use crate::value::Value;

// ============================================================================
// PRESENCE
// ============================================================================

/// Passes when the value is non-empty: not nil, not a zero number, not an
/// empty string or collection.
///
/// Usage: required
pub const CHECK_REQUIRED: CheckFn = |value, _args| !value.is_empty();

// ============================================================================
// ORDERING
// ============================================================================

/// Passes when value >= arg, both coerced to a common numeric form.
///
/// Usage: min:N
pub const CHECK_MIN: CheckFn = |value, args| compare_numeric(value, args, |a, b| a >= b);

/// Passes when value <= arg.
///
/// Usage: max:N
pub const CHECK_MAX: CheckFn = |value, args| compare_numeric(value, args, |a, b| a <= b);

/// Passes when value > arg.
///
/// Usage: gt:N
pub const CHECK_GT: CheckFn = |value, args| compare_numeric(value, args, |a, b| a > b);

/// Passes when value < arg.
///
/// Usage: lt:N
pub const CHECK_LT: CheckFn = |value, args| compare_numeric(value, args, |a, b| a < b);

// ============================================================================
// EQUALITY
// ============================================================================

/// Variant-sensitive equality against the first argument: `Str("5")` does
/// not equal `Int(5)`.
///
/// Usage: eq:X
pub const CHECK_EQ: CheckFn = |value, args| args.first().map(|a| a == value).unwrap_or(false);

/// Negated `eq`.
///
/// Usage: ne:X
pub const CHECK_NE: CheckFn = |value, args| !CHECK_EQ(value, args);

// ============================================================================
// MEMBERSHIP
// ============================================================================

/// Variant-sensitive membership: candidates parse to their natural variant,
/// so `in:1,2,3` holds `Int` candidates and a `Uint` or `Str` value is not a
/// member even when numerically or textually equal. Use `in_ints` (or
/// convert with `Value::to_int` first) for relaxed typed-enum matching.
///
/// Usage: in:a,b,c
pub const CHECK_IN: CheckFn = |value, args| args.iter().any(|c| c == value);

/// Negated `in`.
///
/// Usage: notIn:a,b,c
pub const CHECK_NOT_IN: CheckFn = |value, args| !CHECK_IN(value, args);

/// Relaxed integer membership: both the value and every candidate coerce
/// through `to_int` before comparing. The explicit opt-out from `in`'s
/// type sensitivity.
///
/// Usage: in_ints:1,2,3
pub const CHECK_IN_INTS: CheckFn = |value, args| {
    let Some(n) = value.to_int() else {
        return false;
    };
    args.iter().any(|c| c.to_int() == Some(n))
};

// ============================================================================
// REGISTRATION FUNCTION
// ============================================================================

pub fn register_compare_checks(registry: &mut CheckRegistry) {
    registry.register_builtin("required", CHECK_REQUIRED, Arity::NONE);
    registry.register_builtin("min", CHECK_MIN, Arity::ONE);
    registry.register_builtin("max", CHECK_MAX, Arity::ONE);
    registry.register_builtin("gt", CHECK_GT, Arity::ONE);
    registry.register_builtin("lt", CHECK_LT, Arity::ONE);
    registry.register_builtin("eq", CHECK_EQ, Arity::ONE);
    registry.register_builtin("ne", CHECK_NE, Arity::ONE);
    registry.register_builtin("in", CHECK_IN, Arity::at_least(1));
    registry.register_builtin("notIn", CHECK_NOT_IN, Arity::at_least(1));
    registry.register_builtin("in_ints", CHECK_IN_INTS, Arity::at_least(1));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_zero_values() {
        assert!(CHECK_REQUIRED(&Value::Int(1), &[]));
        assert!(!CHECK_REQUIRED(&Value::Int(0), &[]));
        assert!(!CHECK_REQUIRED(&Value::Str(String::new()), &[]));
        assert!(!CHECK_REQUIRED(&Value::Nil, &[]));
    }

    #[test]
    fn ordering_coerces_to_numeric() {
        let hundred = [Value::Int(100)];
        assert!(CHECK_GT(&Value::Int(150), &hundred));
        assert!(!CHECK_GT(&Value::Int(100), &hundred));
        assert!(CHECK_MIN(&Value::Float(100.0), &hundred));
        assert!(CHECK_LT(&Value::Str("50".into()), &hundred));
    }

    #[test]
    fn membership_is_variant_sensitive() {
        let candidates = [Value::Int(1), Value::Int(2), Value::Int(3)];
        assert!(CHECK_IN(&Value::Int(2), &candidates));
        assert!(!CHECK_IN(&Value::Uint(2), &candidates));
        assert!(!CHECK_IN(&Value::Str("2".into()), &candidates));
        assert!(CHECK_NOT_IN(&Value::Uint(2), &candidates));
    }

    #[test]
    fn in_ints_relaxes_the_variant_check() {
        let candidates = [Value::Int(1), Value::Int(2)];
        assert!(CHECK_IN_INTS(&Value::Uint(2), &candidates));
        assert!(CHECK_IN_INTS(&Value::Str("2".into()), &candidates));
        assert!(!CHECK_IN_INTS(&Value::Str("9".into()), &candidates));
    }

    #[test]
    fn equality() {
        assert!(CHECK_EQ(&Value::Int(5), &[Value::Int(5)]));
        assert!(!CHECK_EQ(&Value::Str("5".into()), &[Value::Int(5)]));
        assert!(CHECK_NE(&Value::Str("5".into()), &[Value::Int(5)]));
    }
}
