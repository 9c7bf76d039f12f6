//! Rule model: a named invocation with raw arguments, and the ordered
//! per-field chain the pipeline executes. Argument tokens stay raw strings
//! here; they are coerced to the target check's expected type at call time.

use crate::value::Value;

pub mod parser;

/// One filter or validator invocation bound to a field.
#[derive(Debug, Clone)]
pub struct Rule {
    name: String,
    args: Vec<String>,
    is_filter: bool,
    skip_empty: Option<bool>,
    message: Option<String>,
}

impl Rule {
    pub(crate) fn new(name: impl Into<String>, args: Vec<String>, is_filter: bool) -> Self {
        Self {
            name: name.into(),
            args,
            is_filter,
            skip_empty: None,
            message: None,
        }
    }

    /// Canonical rule name (aliases already resolved).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw argument tokens, in declared order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn is_filter(&self) -> bool {
        self.is_filter
    }

    /// Overrides the skip-empty policy for this rule alone. Unset rules
    /// follow the session default.
    pub fn set_skip_empty(&mut self, skip: bool) -> &mut Self {
        self.skip_empty = Some(skip);
        self
    }

    /// Attaches a custom failure message to this rule.
    pub fn set_message(&mut self, message: &str) -> &mut Self {
        self.message = Some(message.to_string());
        self
    }

    /// The effective skip-empty policy given the session default.
    pub fn skip_empty(&self, default: bool) -> bool {
        self.skip_empty.unwrap_or(default)
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Arguments coerced to their natural value forms for dispatch.
    pub(crate) fn arg_values(&self) -> Vec<Value> {
        self.args.iter().map(|t| Value::natural(t)).collect()
    }
}

/// The ordered rules bound to one field. Filters execute before validators;
/// within each group, declaration order holds.
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub field: String,
    rules: Vec<Rule>,
}

impl FieldRules {
    fn new(field: &str) -> Self {
        Self {
            field: field.to_string(),
            rules: Vec::new(),
        }
    }

    pub fn push(&mut self, rule: Rule) -> &mut Rule {
        self.rules.push(rule);
        self.rules.last_mut().expect("just pushed")
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn filters(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.is_filter())
    }

    pub fn validators(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| !r.is_filter())
    }

    /// Whether the chain gates on presence.
    pub fn has_required(&self) -> bool {
        self.rules.iter().any(|r| !r.is_filter() && r.name() == "required")
    }
}

/// Field identifier → ordered rule sequence, preserving the order fields
/// were first bound in.
#[derive(Debug, Clone, Default)]
pub struct RuleChain {
    entries: Vec<FieldRules>,
}

impl RuleChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// The entry for `field`, created on first use.
    pub fn entry_mut(&mut self, field: &str) -> &mut FieldRules {
        if let Some(i) = self.entries.iter().position(|e| e.field == field) {
            &mut self.entries[i]
        } else {
            self.entries.push(FieldRules::new(field));
            self.entries.last_mut().expect("just pushed")
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldRules> {
        self.entries.iter().find(|e| e.field == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldRules> {
        self.entries.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.field.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently added rule, for builder-style tweaks.
    pub fn last_rule_mut(&mut self) -> Option<&mut Rule> {
        self.entries.last_mut().and_then(|e| e.rules.last_mut())
    }
}
