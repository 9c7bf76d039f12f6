//!
//! Message resolution for failed rules.
//!
//! Precedence for a failed `(field, rule)` pair:
//!
//! 1. the rule's own custom message (from a message-string section)
//! 2. an override registered for `Field.rule`
//! 3. an override registered for `rule` alone
//! 4. a process-wide override registered for `rule`
//! 5. the rule's built-in template
//!
//! Templates substitute `{field}` with the field's display name (translated
//! when a translation is registered, the raw key otherwise), positional
//! `{0}`, `{1}`, ... with the rule's arguments, and `{args}` with the full
//! comma-joined argument list.

use crate::value::Value;
use std::collections::HashMap;

/// Fallback for rules without a registered template.
pub const DEFAULT_TEMPLATE: &str = "{field} did not pass validation";

/// Template used when a filter cannot convert the working value.
pub const FILTER_TEMPLATE: &str = "{field} value could not be converted by the {0} filter";

// ============================================================================
// BUILT-IN TEMPLATES
// ============================================================================

const TEMPLATES: &[(&str, &str)] = &[
    ("required", "{field} is required and cannot be empty"),
    ("string", "{field} value must be a string"),
    ("int", "{field} value must be an integer"),
    ("float", "{field} value must be a float"),
    ("bool", "{field} value must be a boolean"),
    ("list", "{field} value must be a list"),
    ("map", "{field} value must be a map"),
    ("min", "{field} min value is {0}"),
    ("max", "{field} max value is {0}"),
    ("gt", "{field} value should greater the {0}"),
    ("lt", "{field} value should less the {0}"),
    ("eq", "{field} value must equal {0}"),
    ("ne", "{field} value must not equal {0}"),
    ("minLen", "{field} min length is {0}"),
    ("maxLen", "{field} max length is {0}"),
    ("in", "{field} value must be in the enum [{args}]"),
    ("notIn", "{field} value must not be in the enum [{args}]"),
    ("in_ints", "{field} value must be in the enum [{args}]"),
    ("email", "{field} is not a valid email address"),
    ("url", "{field} is not a valid URL"),
    ("fullUrl", "{field} is not a valid full URL"),
    ("str_num", "{field} must be a numeric string"),
    ("alpha", "{field} must contain only letters"),
    ("alphaNum", "{field} must contain only letters and digits"),
    ("ip", "{field} is not a valid IP address"),
    ("ipv4", "{field} is not a valid IPv4 address"),
    ("regex", "{field} does not match the required pattern"),
];

fn template_for(rule: &str) -> &'static str {
    TEMPLATES
        .iter()
        .find(|(name, _)| *name == rule)
        .map(|(_, tpl)| *tpl)
        .unwrap_or(DEFAULT_TEMPLATE)
}

// ============================================================================
// OVERRIDES AND TRANSLATIONS
// ============================================================================

/// Session-level message overrides, keyed `rule` or `Field.rule`.
#[derive(Debug, Clone, Default)]
pub struct MessageBag {
    overrides: HashMap<String, String>,
}

impl MessageBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, text: &str) {
        self.overrides.insert(key.to_string(), text.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.overrides.get(key).map(String::as_str)
    }
}

/// Field display-name translation table.
#[derive(Debug, Clone, Default)]
pub struct Translations {
    names: HashMap<String, String>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, name: &str) {
        self.names.insert(field.to_string(), name.to_string());
    }

    /// The display name for `field`, falling back to `fallback` (the
    /// naming-resolved key) when no translation is registered.
    pub fn display<'a>(&'a self, field: &str, fallback: &'a str) -> &'a str {
        self.names.get(field).map(String::as_str).unwrap_or(fallback)
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Resolves the display message for a failed rule.
///
/// `field` is the raw field identifier rules were bound under (override keys
/// and translations use it); `display` is the naming-resolved key shown when
/// no translation exists. `rule_msg` is the per-rule custom message, when
/// the chain carries one; `global` is the process-wide override table
/// snapshotted by the session.
pub fn resolve(
    bag: &MessageBag,
    global: &HashMap<String, String>,
    trans: &Translations,
    field: &str,
    display: &str,
    rule: &str,
    rule_msg: Option<&str>,
    args: &[Value],
) -> String {
    let field_rule = format!("{}.{}", field, rule);
    let template = rule_msg
        .or_else(|| bag.get(&field_rule))
        .or_else(|| bag.get(rule))
        .or_else(|| global.get(rule).map(String::as_str))
        .unwrap_or_else(|| template_for(rule));
    render(template, trans.display(field, display), args)
}

/// Substitutes `{field}`, `{args}` and positional `{N}` placeholders.
pub fn render(template: &str, display: &str, args: &[Value]) -> String {
    let mut out = template.replace("{field}", display);
    if out.contains("{args}") {
        let joined = args
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(",");
        out = out.replace("{args}", &joined);
    }
    for (i, arg) in args.iter().enumerate() {
        let slot = format!("{{{}}}", i);
        if out.contains(&slot) {
            out = out.replace(&slot, &arg.to_string());
        }
    }
    out
}
