//! Process-wide option set.
//!
//! Sessions snapshot the options at construction, so a `config` call affects
//! sessions built afterwards, never ones already in flight. Mutating options
//! concurrently with in-flight sessions is out of contract; configure during
//! setup, validate afterwards. `reset_option` restores the defaults.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::RwLock;

/// Which source names a field in errors and safe data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTag {
    /// The record's declared field identifier.
    Ident,
    /// The per-field alias (JSON-style name) when the record supplies one,
    /// falling back to the declared identifier.
    Alias,
}

#[derive(Debug, Clone)]
pub struct Options {
    /// Naming source for field keys.
    pub field_tag: FieldTag,
    /// Default skip-empty policy for rules that do not set their own.
    pub skip_empty: bool,
    /// Halt the run at the first failing field.
    pub stop_on_error: bool,
    /// Process-wide message overrides, keyed by rule name.
    pub messages: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            field_tag: FieldTag::Ident,
            skip_empty: true,
            stop_on_error: false,
            messages: HashMap::new(),
        }
    }
}

static GLOBAL: Lazy<RwLock<Options>> = Lazy::new(|| RwLock::new(Options::default()));

/// Applies `mutator` to the process-wide options. Setup-time only.
pub fn config(mutator: impl FnOnce(&mut Options)) {
    if let Ok(mut opts) = GLOBAL.write() {
        mutator(&mut opts);
    }
}

/// Restores the process-wide options to their defaults.
pub fn reset_option() {
    if let Ok(mut opts) = GLOBAL.write() {
        *opts = Options::default();
    }
}

/// Registers process-wide message overrides, keyed by rule name.
pub fn add_global_messages(pairs: &[(&str, &str)]) {
    config(|opts| {
        for (rule, text) in pairs {
            opts.messages.insert(rule.to_string(), text.to_string());
        }
    });
}

/// The option snapshot a new session starts from.
pub(crate) fn snapshot() -> Options {
    GLOBAL
        .read()
        .map(|opts| opts.clone())
        .unwrap_or_default()
}
