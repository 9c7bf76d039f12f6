//! Shared guard and coercion infrastructure for the built-in checks.
//!
//! Rule callables never panic: every helper coerces defensively and reports
//! an unusable value as a plain `false`/`None`, which the pipeline records as
//! a failed rule rather than a crash.

use crate::value::Value;
use unicode_segmentation::UnicodeSegmentation;

/// Length in elements: grapheme clusters for strings, entries for lists and
/// maps. Other variants have no length.
pub fn value_len(value: &Value) -> Option<usize> {
    match value {
        Value::Str(s) => Some(s.graphemes(true).count()),
        Value::List(items) => Some(items.len()),
        Value::Map(map) => Some(map.len()),
        _ => None,
    }
}

/// Coerces the value and the first rule argument to a common numeric
/// representation and applies `cmp`. Unusable operands fail the rule.
pub fn compare_numeric(value: &Value, args: &[Value], cmp: fn(f64, f64) -> bool) -> bool {
    let (Some(lhs), Some(rhs)) = (value.to_float(), args.first().and_then(Value::to_float))
    else {
        return false;
    };
    cmp(lhs, rhs)
}

/// The integer form of argument `i`, when it has one.
pub fn arg_int(args: &[Value], i: usize) -> Option<i64> {
    args.get(i).and_then(Value::to_int)
}

/// Inclusive numeric bounds check used by the optional `int:min,max` form.
pub fn within_bounds(n: i64, args: &[Value]) -> bool {
    if let Some(min) = arg_int(args, 0) {
        if n < min {
            return false;
        }
    }
    if let Some(max) = arg_int(args, 1) {
        if n > max {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grapheme_length() {
        assert_eq!(value_len(&Value::Str("héllo".into())), Some(5));
        assert_eq!(value_len(&Value::Str("🦀🦀".into())), Some(2));
        assert_eq!(value_len(&Value::Int(5)), None);
    }

    #[test]
    fn numeric_comparison_coerces_both_sides() {
        let args = [Value::Int(100)];
        assert!(compare_numeric(&Value::Str("150".into()), &args, |a, b| a > b));
        assert!(!compare_numeric(&Value::Str("abc".into()), &args, |a, b| a > b));
        assert!(!compare_numeric(&Value::Int(1), &[], |a, b| a > b));
    }

    #[test]
    fn bounds() {
        let args = [Value::Int(1), Value::Int(10)];
        assert!(within_bounds(5, &args));
        assert!(!within_bounds(0, &args));
        assert!(!within_bounds(11, &args));
        assert!(within_bounds(11, &args[..1]));
    }
}
