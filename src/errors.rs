//! Error types for the two failure planes: fatal configuration errors raised
//! while a rule chain is built, and per-field validation failures accumulated
//! while a session runs. Config errors carry the offending rule string as a
//! `miette` source so the bad token is labeled in reports.

use miette::{Diagnostic, NamedSource, SourceSpan};
use rand::Rng;
use std::fmt;
use thiserror::Error;

// ============================================================================
// CONFIGURATION ERRORS - fatal at chain-build time
// ============================================================================

/// A malformed rule chain. Raised while rules are added or parsed, before any
/// validation runs; a session that produced one of these never validates.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown rule '{name}'")]
    #[diagnostic(help("register custom rules with add_validator before referencing them"))]
    UnknownRule {
        name: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not a registered validator or filter")]
        span: SourceSpan,
    },

    #[error("rule '{name}' expects {expected} argument(s), got {actual}")]
    BadArity {
        name: String,
        expected: String,
        actual: usize,
        #[source_code]
        src: NamedSource<String>,
        #[label("wrong number of arguments")]
        span: SourceSpan,
    },

    #[error("malformed rule segment")]
    #[diagnostic(help("each segment is `name` or `name:arg1,arg2,...`"))]
    MalformedRule {
        #[source_code]
        src: NamedSource<String>,
        #[label("empty rule name")]
        span: SourceSpan,
    },

    #[error("rule chain bound to an empty field name")]
    EmptyField,

    #[error("input is not a JSON object")]
    InvalidInput {
        #[source]
        source: Option<serde_json::Error>,
    },
}

// ============================================================================
// WRITE-PATH CONDITIONS - returned by the explicit set operation
// ============================================================================

/// Failure conditions of the explicit `set`/write-back path. These are
/// returned as results, never accumulated into the error collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// The binding is read-only: the session was built from a by-value or
    /// shared input, so mutation cannot reach the caller's data.
    #[error("value is not settable through this binding")]
    NotSettable,
    /// The value could not be converted to the destination field's type.
    #[error("value could not be converted to the destination type")]
    ConvertFailed,
    /// The named field does not exist on the bound record.
    #[error("field does not exist")]
    UnknownField,
}

// ============================================================================
// FIELD ERRORS - accumulated during a run
// ============================================================================

/// One failed rule for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Ordered collection of field errors for one validation run, with per-field
/// lookup. Append-only while the session runs, immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollection {
    items: Vec<FieldError>,
}

impl ErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, field: &str, rule: &str, message: String) {
        self.items.push(FieldError {
            field: field.to_string(),
            rule: rule.to_string(),
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The first recorded message, in chain order.
    pub fn one(&self) -> Option<&str> {
        self.items.first().map(|e| e.message.as_str())
    }

    /// The first failure recorded for `field`, deterministic by rule-chain
    /// order.
    pub fn field_one(&self, field: &str) -> Option<&FieldError> {
        self.items.iter().find(|e| e.field == field)
    }

    /// All failures recorded for `field`, in rule-chain order.
    pub fn field_all(&self, field: &str) -> Vec<&FieldError> {
        self.items.iter().filter(|e| e.field == field).collect()
    }

    /// An arbitrary single message. Not deterministic across runs when more
    /// than one error was collected; assert membership, not a fixed value.
    pub fn random(&self) -> Option<&str> {
        if self.items.is_empty() {
            return None;
        }
        let idx = rand::thread_rng().gen_range(0..self.items.len());
        self.items.get(idx).map(|e| e.message.as_str())
    }

    /// Fields that recorded at least one failure, in first-failure order.
    pub fn fields(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for e in &self.items {
            if !seen.contains(&e.field.as_str()) {
                seen.push(e.field.as_str());
            }
        }
        seen
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.items.iter()
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for e in &self.items {
            writeln!(f, "{}", e)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
