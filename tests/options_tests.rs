use sieve::checks::{self, Arity};
use sieve::{options, Validation, Value, ValueMap};

fn map(entries: &[(&str, Value)]) -> ValueMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

// Global options are process-wide; this test exercises the whole
// config/reset lifecycle in one sequence to keep the mutations ordered.
#[test]
fn global_configuration_round_trip() {
    // flipping the default skip-empty policy fires rules on empty values
    options::config(|opts| opts.skip_empty = false);
    let mut v = Validation::from_map(map(&[("a", Value::Int(0))]));
    v.string_rule("a", "gt:100").unwrap();
    assert!(!v.validate());
    assert_eq!(v.errors().one(), Some("a value should greater the 100"));

    options::reset_option();

    // after reset, empty values skip non-required rules again
    let mut v = Validation::from_map(map(&[("a", Value::Int(0))]));
    v.string_rule("a", "gt:100").unwrap();
    assert!(v.validate());

    // a session built before a config call keeps its snapshot
    let mut early = Validation::from_map(map(&[("a", Value::Int(0))]));
    early.string_rule("a", "gt:100").unwrap();
    options::config(|opts| opts.skip_empty = false);
    assert!(early.validate());
    options::reset_option();

    // process-wide message overrides sit behind session overrides
    options::add_global_messages(&[("required", "{field} must not be blank")]);
    let mut v = Validation::from_map(map(&[("name", Value::Str("".into()))]));
    v.string_rule("name", "required").unwrap();
    assert!(!v.validate());
    assert_eq!(v.errors().one(), Some("name must not be blank"));

    let mut v = Validation::from_map(map(&[("name", Value::Str("".into()))]));
    v.string_rule("name", "required").unwrap();
    v.add_messages(&[("required", "session message wins")]);
    assert!(!v.validate());
    assert_eq!(v.errors().one(), Some("session message wins"));

    options::reset_option();
}

#[test]
fn process_wide_validator_registration() {
    checks::register_global("ascii_only", Arity::NONE, |value, _| {
        value.as_str().map(|s| s.is_ascii()).unwrap_or(false)
    });

    let mut v = Validation::from_map(map(&[("s", Value::Str("plain".into()))]));
    v.string_rule("s", "required|ascii_only").unwrap();
    assert!(v.validate());

    let mut v = Validation::from_map(map(&[("s", Value::Str("héllo".into()))]));
    v.string_rule("s", "required|ascii_only").unwrap();
    assert!(!v.validate());
    assert_eq!(v.errors().field_one("s").unwrap().rule, "ascii_only");
}
