//! Rule-string parser.
//!
//! Converts compact rule strings like `"required|minLen:6"` into ordered
//! [`Rule`] sequences. The grammar is fixed and small: rules separated by
//! `|`, each rule `name` or `name:arg1,arg2,...`. Unknown names and arity
//! violations are configuration errors at build time, with the offending
//! token labeled inside the rule string.

use crate::checks::Arity;
use crate::errors::ConfigError;
use crate::rules::Rule;
use miette::NamedSource;

/// Resolves a rule name to its canonical form and arity contract; `None`
/// means the name is unknown. The session supplies a resolver that consults
/// its own registrations ahead of the process-wide and built-in tables.
pub type NameResolver<'r> = &'r dyn Fn(&str) -> Option<(String, Arity)>;

/// Parses one rule string bound to `field`.
pub fn parse_rule_string(
    field: &str,
    input: &str,
    is_filter: bool,
    resolve: NameResolver<'_>,
) -> Result<Vec<Rule>, ConfigError> {
    let mut rules = Vec::new();
    let mut offset = 0usize;

    for segment in input.split('|') {
        let seg_start = offset;
        offset += segment.len() + 1;

        let lead = segment.len() - segment.trim_start().len();
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MalformedRule {
                src: named(field, input),
                span: (seg_start, segment.len().max(1)).into(),
            });
        }

        let (raw_name, raw_args) = match trimmed.split_once(':') {
            Some((name, args)) => (name.trim(), Some(args)),
            None => (trimmed, None),
        };
        if raw_name.is_empty() {
            return Err(ConfigError::MalformedRule {
                src: named(field, input),
                span: (seg_start + lead, trimmed.len().max(1)).into(),
            });
        }

        let Some((canonical, arity)) = resolve(raw_name) else {
            return Err(ConfigError::UnknownRule {
                name: raw_name.to_string(),
                src: named(field, input),
                span: (seg_start + lead, raw_name.len()).into(),
            });
        };

        let args: Vec<String> = match raw_args {
            Some(list) => list.split(',').map(|a| a.trim().to_string()).collect(),
            None => Vec::new(),
        };
        if !arity.accepts(args.len()) {
            return Err(ConfigError::BadArity {
                name: canonical,
                expected: arity.describe(),
                actual: args.len(),
                src: named(field, input),
                span: (seg_start + lead, trimmed.len()).into(),
            });
        }

        rules.push(Rule::new(canonical, args, is_filter));
    }

    Ok(rules)
}

/// Parses a message string like `"required:msg A|minLen:msg B"` into
/// `(rule key, text)` sections. A section whose prefix `is_key` rejects is
/// the default message (`None` key). Keys may be `rule` or `Field.rule`.
pub fn parse_message_string(
    input: &str,
    is_key: &dyn Fn(&str) -> bool,
) -> Vec<(Option<String>, String)> {
    let mut sections = Vec::new();
    for segment in input.split('|') {
        let trimmed = segment.trim();
        if trimmed.is_empty() {
            continue;
        }
        match trimmed.split_once(':') {
            Some((key, text)) if !key.trim().is_empty() && is_key(key.trim()) => {
                sections.push((Some(key.trim().to_string()), text.trim().to_string()));
            }
            _ => sections.push((None, trimmed.to_string())),
        }
    }
    sections
}

fn named(field: &str, input: &str) -> NamedSource<String> {
    NamedSource::new(field, input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks;

    fn resolver(name: &str) -> Option<(String, Arity)> {
        let canonical = checks::canonical_check(name);
        checks::lookup_check(canonical).map(|spec| (canonical.to_string(), spec.arity))
    }

    #[test]
    fn parses_names_and_argument_lists() {
        let rules =
            parse_rule_string("title", "required|in:1,2,3,4", false, &resolver).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name(), "required");
        assert!(rules[0].args().is_empty());
        assert_eq!(rules[1].name(), "in");
        assert_eq!(rules[1].args(), ["1", "2", "3", "4"]);
    }

    #[test]
    fn aliases_resolve_during_parse() {
        let rules = parse_rule_string("name", "minLength:6", false, &resolver).unwrap();
        assert_eq!(rules[0].name(), "minLen");
    }

    #[test]
    fn unknown_rule_is_a_config_error() {
        let err = parse_rule_string("name", "required|bogus", false, &resolver).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule { name, .. } if name == "bogus"));
    }

    #[test]
    fn arity_is_checked_at_build_time() {
        let err = parse_rule_string("age", "min", false, &resolver).unwrap_err();
        assert!(matches!(err, ConfigError::BadArity { name, .. } if name == "min"));

        let err = parse_rule_string("age", "min:1,2", false, &resolver).unwrap_err();
        assert!(matches!(err, ConfigError::BadArity { actual: 2, .. }));
    }

    #[test]
    fn empty_segments_are_malformed() {
        let err = parse_rule_string("age", "required||min:1", false, &resolver).unwrap_err();
        assert!(matches!(err, ConfigError::MalformedRule { .. }));
    }

    #[test]
    fn message_sections_split_on_known_keys() {
        let chain_rules = ["required", "minLen"];
        let is_key =
            |k: &str| k.contains('.') || chain_rules.contains(&checks::canonical_check(k));
        let sections =
            parse_message_string("required:msg A|minLen:msg B", &is_key);
        assert_eq!(
            sections,
            vec![
                (Some("required".to_string()), "msg A".to_string()),
                (Some("minLen".to_string()), "msg B".to_string()),
            ]
        );

        let sections = parse_message_string("just one default message", &is_key);
        assert_eq!(sections, vec![(None, "just one default message".to_string())]);
    }
}
