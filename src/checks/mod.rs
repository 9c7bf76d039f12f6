//! # Sieve Check System
//!
//! This module provides the validator and filter registries for the engine.
//! Checks are the named predicates a rule chain dispatches to; filters are
//! the named transformers that run ahead of them.
//!
//! ## Module Structure
//!
//! - **`helpers`**: Shared coercion/guard infrastructure for all checks
//! - **`compare`**: Presence, ordering, equality and membership checks
//! - **`string`**: Type assertions, length and string-format checks
//! - **`filters`**: String normalizers and type casts
//!
//! ## Design Principles
//!
//! - **Consistent Interface**: every check uses the same `CheckFn` contract,
//!   every filter the same `FilterFn` contract
//! - **No Panics**: callables receive an already-guarded value and report an
//!   unusable one as a failed rule, never a crash
//! - **Uniform Dispatch**: a user-registered callable is indistinguishable
//!   from a built-in once registered
//!
//! The built-in tables are constructed once and are read-only; process-wide
//! custom registration is guarded for concurrent reads but is intended for
//! setup time only, not while sessions are in flight.

use crate::errors::ErrorKind;
use crate::value::Value;
use im::HashMap;
use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Built-in check contract: the (filtered) working value and the rule's
/// coerced arguments in, a pass/fail verdict out.
pub type CheckFn = fn(value: &Value, args: &[Value]) -> bool;

/// Built-in filter contract: replaces the working value, or reports that the
/// value cannot be represented in the target form.
pub type FilterFn = fn(value: &Value, args: &[Value]) -> Result<Value, ErrorKind>;

/// The unified check representation: built-in fn pointers and user-supplied
/// closures dispatch identically.
#[derive(Clone)]
pub enum Check {
    Builtin(CheckFn),
    Custom(Arc<dyn Fn(&Value, &[Value]) -> bool + Send + Sync>),
}

impl Check {
    pub fn call(&self, value: &Value, args: &[Value]) -> bool {
        match self {
            Check::Builtin(f) => f(value, args),
            Check::Custom(f) => f(value, args),
        }
    }
}

/// The unified filter representation.
#[derive(Clone)]
pub enum Filter {
    Builtin(FilterFn),
    Custom(Arc<dyn Fn(&Value, &[Value]) -> Result<Value, ErrorKind> + Send + Sync>),
}

impl Filter {
    pub fn call(&self, value: &Value, args: &[Value]) -> Result<Value, ErrorKind> {
        match self {
            Filter::Builtin(f) => f(value, args),
            Filter::Custom(f) => f(value, args),
        }
    }
}

/// Argument-count contract, enforced at chain-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const NONE: Arity = Arity {
        min: 0,
        max: Some(0),
    };
    pub const ONE: Arity = Arity {
        min: 1,
        max: Some(1),
    };

    pub const fn at_least(min: usize) -> Arity {
        Arity { min, max: None }
    }

    pub const fn range(min: usize, max: usize) -> Arity {
        Arity {
            min,
            max: Some(max),
        }
    }

    pub fn accepts(&self, n: usize) -> bool {
        n >= self.min && self.max.map(|m| n <= m).unwrap_or(true)
    }

    pub fn describe(&self) -> String {
        match (self.min, self.max) {
            (min, Some(max)) if min == max => format!("exactly {}", min),
            (min, Some(max)) => format!("between {} and {}", min, max),
            (min, None) => format!("at least {}", min),
        }
    }
}

/// A registered check with its arity contract.
#[derive(Clone)]
pub struct CheckSpec {
    pub check: Check,
    pub arity: Arity,
}

/// A registered filter with its arity contract.
#[derive(Clone)]
pub struct FilterSpec {
    pub filter: Filter,
    pub arity: Arity,
}

// ============================================================================
// REGISTRIES
// ============================================================================

/// Name-indexed check dispatch table, inspectable at runtime.
#[derive(Default, Clone)]
pub struct CheckRegistry {
    checks: HashMap<String, CheckSpec>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&CheckSpec> {
        self.checks.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    pub fn list(&self) -> Vec<String> {
        self.checks.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn register_builtin(&mut self, name: &str, check: CheckFn, arity: Arity) {
        self.checks.insert(
            name.to_string(),
            CheckSpec {
                check: Check::Builtin(check),
                arity,
            },
        );
    }

    /// API for extensibility; once registered, dispatch cannot tell the
    /// callable from a built-in.
    pub fn register<F>(&mut self, name: &str, arity: Arity, f: F)
    where
        F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.checks.insert(
            name.to_string(),
            CheckSpec {
                check: Check::Custom(Arc::new(f)),
                arity,
            },
        );
    }
}

/// Name-indexed filter dispatch table.
#[derive(Default, Clone)]
pub struct FilterRegistry {
    filters: HashMap<String, FilterSpec>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FilterSpec> {
        self.filters.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    pub fn register_builtin(&mut self, name: &str, filter: FilterFn, arity: Arity) {
        self.filters.insert(
            name.to_string(),
            FilterSpec {
                filter: Filter::Builtin(filter),
                arity,
            },
        );
    }

    pub fn register<F>(&mut self, name: &str, arity: Arity, f: F)
    where
        F: Fn(&Value, &[Value]) -> Result<Value, ErrorKind> + Send + Sync + 'static,
    {
        self.filters.insert(
            name.to_string(),
            FilterSpec {
                filter: Filter::Custom(Arc::new(f)),
                arity,
            },
        );
    }
}

// ============================================================================
// MODULAR CHECK IMPLEMENTATIONS
// ============================================================================

// Core infrastructure shared by all checks
pub mod helpers;

// Domain-specific check modules
pub mod compare;
pub mod filters;
pub mod string;

// ============================================================================
// UNIFIED REGISTRATION FUNCTIONS
// ============================================================================

/// Registers all built-in checks from all modules with the given registry.
pub fn register_all_checks(registry: &mut CheckRegistry) {
    compare::register_compare_checks(registry);
    string::register_string_checks(registry);
}

/// Registers all built-in filters with the given registry.
pub fn register_all_filters(registry: &mut FilterRegistry) {
    filters::register_filters(registry);
}

// ============================================================================
// PROCESS-WIDE TABLES
// ============================================================================

static BUILTIN_CHECKS: Lazy<CheckRegistry> = Lazy::new(|| {
    let mut registry = CheckRegistry::new();
    register_all_checks(&mut registry);
    registry
});

static BUILTIN_FILTERS: Lazy<FilterRegistry> = Lazy::new(|| {
    let mut registry = FilterRegistry::new();
    register_all_filters(&mut registry);
    registry
});

static GLOBAL_CHECKS: Lazy<RwLock<CheckRegistry>> =
    Lazy::new(|| RwLock::new(CheckRegistry::new()));

static GLOBAL_FILTERS: Lazy<RwLock<FilterRegistry>> =
    Lazy::new(|| RwLock::new(FilterRegistry::new()));

/// Registers a validator for every future session. Setup-time only: mutating
/// the table while sessions are in flight is out of contract.
pub fn register_global<F>(name: &str, arity: Arity, f: F)
where
    F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
{
    if let Ok(mut registry) = GLOBAL_CHECKS.write() {
        registry.register(name, arity, f);
    }
}

/// Registers a filter for every future session. Setup-time only.
pub fn register_global_filter<F>(name: &str, arity: Arity, f: F)
where
    F: Fn(&Value, &[Value]) -> Result<Value, ErrorKind> + Send + Sync + 'static,
{
    if let Ok(mut registry) = GLOBAL_FILTERS.write() {
        registry.register(name, arity, f);
    }
}

/// Resolves a check: process-wide registrations shadow built-ins.
pub fn lookup_check(name: &str) -> Option<CheckSpec> {
    if let Ok(registry) = GLOBAL_CHECKS.read() {
        if let Some(spec) = registry.get(name) {
            return Some(spec.clone());
        }
    }
    BUILTIN_CHECKS.get(name).cloned()
}

/// Resolves a filter: process-wide registrations shadow built-ins.
pub fn lookup_filter(name: &str) -> Option<FilterSpec> {
    if let Ok(registry) = GLOBAL_FILTERS.read() {
        if let Some(spec) = registry.get(name) {
            return Some(spec.clone());
        }
    }
    BUILTIN_FILTERS.get(name).cloned()
}

// ============================================================================
// RULE-NAME ALIASES
// ============================================================================

/// Alternate spellings accepted in rule strings, resolved at chain build.
const CHECK_ALIASES: &[(&str, &str)] = &[
    ("minLength", "minLen"),
    ("lengthMin", "minLen"),
    ("maxLength", "maxLen"),
    ("lengthMax", "maxLen"),
    ("mustIn", "in"),
    ("enum", "in"),
    ("not_in", "notIn"),
    ("num", "str_num"),
    ("strNum", "str_num"),
    ("full_url", "fullUrl"),
    ("fullURL", "fullUrl"),
    ("integer", "int"),
    ("boolean", "bool"),
    ("str", "string"),
    ("mail", "email"),
    ("equal", "eq"),
    ("notEq", "ne"),
    ("notEqual", "ne"),
    ("greaterThan", "gt"),
    ("lessThan", "lt"),
    ("alpha_num", "alphaNum"),
];

const FILTER_ALIASES: &[(&str, &str)] = &[
    ("trimSpace", "trim"),
    ("lowercase", "lower"),
    ("toLower", "lower"),
    ("uppercase", "upper"),
    ("toUpper", "upper"),
    ("toInt", "int"),
    ("toFloat", "float"),
    ("toString", "string"),
    ("toBool", "bool"),
];

/// Canonical check name for `name`, resolving accepted alias spellings.
pub fn canonical_check(name: &str) -> &str {
    CHECK_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Canonical filter name for `name`.
pub fn canonical_filter(name: &str) -> &str {
    FILTER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        for name in ["required", "min", "in", "email", "minLen", "str_num"] {
            assert!(lookup_check(name).is_some(), "missing builtin: {}", name);
        }
        for name in ["trim", "lower", "int"] {
            assert!(lookup_filter(name).is_some(), "missing filter: {}", name);
        }
        assert!(lookup_check("no_such_rule").is_none());
    }

    #[test]
    fn aliases_resolve_to_canonical_names() {
        assert_eq!(canonical_check("minLength"), "minLen");
        assert_eq!(canonical_check("mustIn"), "in");
        assert_eq!(canonical_check("min"), "min");
        assert_eq!(canonical_filter("lowercase"), "lower");
    }

    #[test]
    fn arity_contracts() {
        assert!(Arity::NONE.accepts(0));
        assert!(!Arity::NONE.accepts(1));
        assert!(Arity::ONE.accepts(1));
        assert!(Arity::at_least(1).accepts(5));
        assert!(!Arity::at_least(1).accepts(0));
        assert_eq!(Arity::ONE.describe(), "exactly 1");
        assert_eq!(Arity::at_least(1).describe(), "at least 1");
        assert_eq!(Arity::range(0, 2).describe(), "between 0 and 2");
    }

    #[test]
    fn custom_checks_dispatch_like_builtins() {
        let mut registry = CheckRegistry::new();
        registry.register("even", Arity::NONE, |value: &Value, _: &[Value]| {
            value.to_int().map(|n| n % 2 == 0).unwrap_or(false)
        });
        let spec = registry.get("even").cloned().expect("registered");
        assert!(spec.check.call(&Value::Int(4), &[]));
        assert!(!spec.check.call(&Value::Int(3), &[]));
    }
}
