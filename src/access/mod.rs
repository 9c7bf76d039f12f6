//! # Data Access Layer
//!
//! A uniform read/write view over the validated input, whether it arrived as
//! a key-value mapping or as a record bound through the [`Record`] capability
//! trait. All reads go through a working value tree (nested `Value::Map`s);
//! dotted paths traverse nested records, and a nil pointer along the way
//! short-circuits traversal with the `nil_parent` flag so the pipeline can
//! report the absence at the pointer's own path.
//!
//! Writes are only permitted through addressable bindings: an owned or
//! `&mut` mapping, or a `&mut` record. Shared record bindings refuse with
//! [`ErrorKind::NotSettable`].

use crate::errors::ErrorKind;
use crate::value::{Value, ValueMap};

pub mod path;

pub use path::FieldPath;

// ============================================================================
// CAPABILITY TRAITS - how record types participate without reflection
// ============================================================================

/// Exposes a record's fields to the accessor.
///
/// `capture` snapshots the field tree once at session build: nested records
/// become nested maps, nil pointers become `Value::Nil`, and embedded
/// (anonymous) sub-records are flattened here into their promoted names.
/// `apply` writes a validated value back into one field, performing the
/// destination's type conversion and returning the value as actually stored.
pub trait Record {
    fn capture(&self) -> ValueMap;

    fn apply(&mut self, field: &str, value: &Value) -> Result<Value, ErrorKind>;
}

/// Declares the record's per-field rule strings, in declaration order.
pub trait HasRules {
    /// `(field, validator rule string)` pairs, e.g. `("age", "required|min:1")`.
    fn rules() -> &'static [(&'static str, &'static str)];

    /// `(field, filter rule string)` pairs, e.g. `("name", "trim|lower")`.
    fn filter_rules() -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// JSON-style per-field aliases, consulted when the alias naming option
    /// is active.
    fn aliases() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// Optional per-rule and per-field message overrides supplied by the record.
/// Keys are `rule` or `Field.rule`.
pub trait HasMessages {
    fn messages() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

/// Optional field display-name translations supplied by the record.
pub trait HasTranslations {
    fn translates() -> &'static [(&'static str, &'static str)] {
        &[]
    }
}

// ============================================================================
// PATH RESOLUTION over the working tree
// ============================================================================

/// The outcome of resolving a dotted path against the working tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The leaf value; `Nil` when the path was absent.
    pub value: Value,
    /// Whether the full path resolved to an existing leaf.
    pub found: bool,
    /// Whether traversal crossed a nil value before reaching the leaf.
    pub nil_parent: bool,
}

/// Walks `path` through nested maps, stopping early at a nil link.
pub fn get_path(root: &ValueMap, path: &FieldPath) -> Resolved {
    let mut current = Value::Map(root.clone());
    for key in path.segments() {
        let map = match &current {
            Value::Map(m) => m,
            Value::Nil => {
                return Resolved {
                    value: Value::Nil,
                    found: false,
                    nil_parent: true,
                }
            }
            _ => {
                return Resolved {
                    value: Value::Nil,
                    found: false,
                    nil_parent: false,
                }
            }
        };
        match map.get(key.as_str()) {
            Some(v) => current = v.clone(),
            None => {
                return Resolved {
                    value: Value::Nil,
                    found: false,
                    nil_parent: false,
                };
            }
        }
    }
    Resolved {
        value: current,
        found: true,
        nil_parent: false,
    }
}

/// Returns a new tree with `value` stored at `path`, creating intermediate
/// maps as needed.
pub fn set_path(root: &ValueMap, path: &FieldPath, value: Value) -> ValueMap {
    if path.segments().is_empty() {
        return root.clone();
    }
    match set_recursive(&Value::Map(root.clone()), path.segments(), value) {
        Value::Map(m) => m,
        _ => root.clone(),
    }
}

fn set_recursive(current: &Value, segments: &[String], val: Value) -> Value {
    let Some(key) = segments.first() else {
        return current.clone();
    };

    let remaining = &segments[1..];
    let mut map = match current {
        Value::Map(m) => m.clone(),
        _ => ValueMap::new(),
    };

    if remaining.is_empty() {
        map.insert(key.clone(), val);
    } else {
        let child = map.get(key).cloned().unwrap_or(Value::Nil);
        let new_child = set_recursive(&child, remaining, val);
        map.insert(key.clone(), new_child);
    }

    Value::Map(map)
}

// ============================================================================
// SOURCE BINDING - where writes land
// ============================================================================

/// The session's hold on the external input. The working tree lives in the
/// session; the binding only determines whether and where writes propagate.
pub enum Source<'a> {
    /// The session owns the mapping outright (built from an owned map or
    /// decoded JSON). Writes land in the working tree only.
    Owned,
    /// A mutable borrow of the caller's mapping; writes propagate into it.
    MapMut(&'a mut ValueMap),
    /// A shared borrow of a record: readable, never settable.
    RecordRef(&'a dyn Record),
    /// A mutable borrow of a record; writes go through [`Record::apply`].
    RecordMut(&'a mut dyn Record),
}

impl Source<'_> {
    /// Whether the explicit set operation can reach the caller's data.
    pub fn settable(&self) -> bool {
        !matches!(self, Source::RecordRef(_))
    }

    /// Propagates a write into the bound input, returning the value as
    /// stored (records may convert it to the destination type).
    pub fn write(&mut self, path: &FieldPath, value: &Value) -> Result<Value, ErrorKind> {
        match self {
            Source::Owned => Ok(value.clone()),
            Source::MapMut(map) => {
                **map = set_path(map, path, value.clone());
                Ok(value.clone())
            }
            Source::RecordRef(_) => Err(ErrorKind::NotSettable),
            Source::RecordMut(rec) => rec.apply(&path.to_string(), value),
        }
    }
}
