//! The validation session: orchestrates chain building, the filter-then-
//! validate pipeline, error aggregation, safe-data extraction, and write-back
//! into mutable bindings.
//!
//! A session moves `Built` → `Running` → `Done` and never returns to
//! `Running`: once `validate` has fixed the verdict, repeated calls return it
//! unchanged and re-validating requires a fresh session. All state for one
//! run (working tree, errors, safe data) is owned exclusively by the session;
//! only the read-only check registries and the option snapshot are shared.

use crate::access::{self, FieldPath, HasMessages, HasRules, HasTranslations, Record, Source};
use crate::checks::{self, Arity, CheckRegistry, CheckSpec, FilterRegistry, FilterSpec};
use crate::errors::{ConfigError, ErrorCollection, ErrorKind};
use crate::messages::{self, MessageBag, Translations, FILTER_TEMPLATE};
use crate::options::{self, FieldTag, Options};
use crate::rules::{parser, FieldRules, Rule, RuleChain};
use crate::value::{Value, ValueMap};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Built,
    Running,
    Done,
}

/// One validation run over one input.
pub struct Validation<'a> {
    source: Source<'a>,
    working: ValueMap,
    chain: RuleChain,
    session_checks: CheckRegistry,
    session_filters: FilterRegistry,
    bag: MessageBag,
    trans: Translations,
    aliases: HashMap<String, String>,
    scenes: HashMap<String, Vec<String>>,
    scene: Option<String>,
    opts: Options,
    safe: ValueMap,
    errors: ErrorCollection,
    state: State,
    verdict: bool,
}

impl<'a> Validation<'a> {
    fn bind(source: Source<'a>, working: ValueMap) -> Self {
        Self {
            source,
            working,
            chain: RuleChain::new(),
            session_checks: CheckRegistry::new(),
            session_filters: FilterRegistry::new(),
            bag: MessageBag::new(),
            trans: Translations::new(),
            aliases: HashMap::new(),
            scenes: HashMap::new(),
            scene: None,
            opts: options::snapshot(),
            safe: ValueMap::new(),
            errors: ErrorCollection::new(),
            state: State::Built,
            verdict: false,
        }
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Builds a session over an owned mapping. The session's copy is the
    /// authoritative data, so explicit `set` works; the caller observes
    /// results through `safe_data`/`raw`.
    pub fn from_map(data: ValueMap) -> Validation<'static> {
        Validation::bind(Source::Owned, data)
    }

    /// Builds a session over a mutable borrow of the caller's mapping.
    /// Filtered values and explicit `set` calls propagate into it.
    pub fn from_map_mut(data: &'a mut ValueMap) -> Validation<'a> {
        let working = data.clone();
        Validation::bind(Source::MapMut(data), working)
    }

    /// Decodes a JSON object and builds a session over the resulting
    /// mapping. Rules are supplied programmatically, as with `from_map`.
    pub fn from_json(json: &str) -> Result<Validation<'static>, ConfigError> {
        let parsed: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| ConfigError::InvalidInput { source: Some(e) })?;
        match Value::from(parsed) {
            Value::Map(map) => Ok(Validation::from_map(map)),
            _ => Err(ConfigError::InvalidInput { source: None }),
        }
    }

    /// Builds a session over a shared record borrow. Rules, messages and
    /// translations come from the record's capability traits. The binding is
    /// read-only: explicit `set` fails with `NotSettable` and filtered
    /// values are not written back.
    pub fn from_record<T>(record: &'a T) -> Result<Validation<'a>, ConfigError>
    where
        T: Record + HasRules + HasMessages + HasTranslations,
    {
        let working = record.capture();
        let mut v = Validation::bind(Source::RecordRef(record), working);
        v.bind_record_meta::<T>()?;
        Ok(v)
    }

    /// Builds a session over a mutable record borrow; filtered values write
    /// back into the record and explicit `set` reaches it.
    pub fn from_record_mut<T>(record: &'a mut T) -> Result<Validation<'a>, ConfigError>
    where
        T: Record + HasRules + HasMessages + HasTranslations,
    {
        let working = record.capture();
        let mut v = Validation::bind(Source::RecordMut(record), working);
        v.bind_record_meta::<T>()?;
        Ok(v)
    }

    fn bind_record_meta<T>(&mut self) -> Result<(), ConfigError>
    where
        T: HasRules + HasMessages + HasTranslations,
    {
        for (field, alias) in T::aliases() {
            self.aliases.insert((*field).to_string(), (*alias).to_string());
        }
        for (field, rule_str) in T::filter_rules() {
            self.filter_rule(field, rule_str)?;
        }
        for (field, rule_str) in T::rules() {
            self.string_rule(field, rule_str)?;
        }
        for (key, text) in T::messages() {
            self.bag.add(key, text);
        }
        for (field, name) in T::translates() {
            self.trans.add(field, name);
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Programmatic rule API
    // ------------------------------------------------------------------------

    /// Adds one validator rule to a field, returning the rule for
    /// builder-style tweaks (`set_skip_empty`, `set_message`).
    pub fn add_rule(
        &mut self,
        field: &str,
        name: &str,
        args: &[&str],
    ) -> Result<&mut Rule, ConfigError> {
        if field.trim().is_empty() {
            return Err(ConfigError::EmptyField);
        }
        let spec = if args.is_empty() {
            name.to_string()
        } else {
            format!("{}:{}", name, args.join(","))
        };
        let mut parsed = {
            let resolver = |n: &str| self.resolve_check(n);
            parser::parse_rule_string(field, &spec, false, &resolver)?
        };
        let rule = parsed.remove(0);
        Ok(self.chain.entry_mut(field).push(rule))
    }

    /// Parses a whole rule string for a field, e.g. `"required|minLen:6"`.
    pub fn string_rule(&mut self, field: &str, rules: &str) -> Result<&mut Self, ConfigError> {
        if field.trim().is_empty() {
            return Err(ConfigError::EmptyField);
        }
        let parsed = {
            let resolver = |n: &str| self.resolve_check(n);
            parser::parse_rule_string(field, rules, false, &resolver)?
        };
        let entry = self.chain.entry_mut(field);
        for rule in parsed {
            entry.push(rule);
        }
        Ok(self)
    }

    /// `string_rule` plus a message string in the `rule:text|...` shorthand.
    /// A section with no rule prefix becomes the first rule's message;
    /// `Field.rule` keys register as-is.
    pub fn string_rule_msgs(
        &mut self,
        field: &str,
        rules: &str,
        msgs: &str,
    ) -> Result<&mut Self, ConfigError> {
        self.string_rule(field, rules)?;
        let names: Vec<String> = self
            .chain
            .get(field)
            .map(|e| e.rules().iter().map(|r| r.name().to_string()).collect())
            .unwrap_or_default();
        let is_key = |k: &str| {
            k.contains('.') || names.iter().any(|n| n == checks::canonical_check(k))
        };
        for (key, text) in parser::parse_message_string(msgs, &is_key) {
            match key {
                Some(k) if k.contains('.') => self.bag.add(&k, &text),
                Some(k) => {
                    let canonical = checks::canonical_check(&k).to_string();
                    self.bag.add(&format!("{}.{}", field, canonical), &text);
                }
                None => {
                    if let Some(first) = names.first() {
                        self.bag.add(&format!("{}.{}", field, first), &text);
                    }
                }
            }
        }
        Ok(self)
    }

    /// Parses rule strings for several fields at once.
    pub fn string_rules(&mut self, pairs: &[(&str, &str)]) -> Result<&mut Self, ConfigError> {
        for (field, rules) in pairs {
            self.string_rule(field, rules)?;
        }
        Ok(self)
    }

    /// Parses a filter rule string for a field, e.g. `"trim|lower"`.
    pub fn filter_rule(&mut self, field: &str, filters: &str) -> Result<&mut Self, ConfigError> {
        if field.trim().is_empty() {
            return Err(ConfigError::EmptyField);
        }
        let parsed = {
            let resolver = |n: &str| self.resolve_filter(n);
            parser::parse_rule_string(field, filters, true, &resolver)?
        };
        let entry = self.chain.entry_mut(field);
        for rule in parsed {
            entry.push(rule);
        }
        Ok(self)
    }

    /// The most recently added rule, for `SetSkipEmpty`-style adjustment
    /// after `string_rule`.
    pub fn last_rule_mut(&mut self) -> Option<&mut Rule> {
        self.chain.last_rule_mut()
    }

    /// Registers a validator for this session under a new name. Once
    /// registered it dispatches exactly like a built-in. Register before
    /// referencing the name in a rule.
    pub fn add_validator<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&Value, &[Value]) -> bool + Send + Sync + 'static,
    {
        self.session_checks.register(name, Arity::at_least(0), f);
        self
    }

    /// Registers a filter for this session under a new name.
    pub fn add_filter<F>(&mut self, name: &str, f: F) -> &mut Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, ErrorKind> + Send + Sync + 'static,
    {
        self.session_filters.register(name, Arity::at_least(0), f);
        self
    }

    /// Registers message overrides, keyed `rule` or `Field.rule`.
    pub fn add_messages(&mut self, pairs: &[(&str, &str)]) -> &mut Self {
        for (key, text) in pairs {
            self.bag.add(key, text);
        }
        self
    }

    /// Registers field display-name translations.
    pub fn add_translates(&mut self, pairs: &[(&str, &str)]) -> &mut Self {
        for (field, name) in pairs {
            self.trans.add(field, name);
        }
        self
    }

    /// Declares named field subsets selectable with `at_scene`.
    pub fn with_scenes(&mut self, scenes: &[(&str, &[&str])]) -> &mut Self {
        for (name, fields) in scenes {
            self.scenes.insert(
                (*name).to_string(),
                fields.iter().map(|f| (*f).to_string()).collect(),
            );
        }
        self
    }

    /// Restricts this run to the named scene's fields.
    pub fn at_scene(&mut self, scene: &str) -> &mut Self {
        self.scene = Some(scene.to_string());
        self
    }

    /// Adjusts this session's option snapshot without touching the
    /// process-wide options.
    pub fn with_options(&mut self, mutator: impl FnOnce(&mut Options)) -> &mut Self {
        mutator(&mut self.opts);
        self
    }

    // ------------------------------------------------------------------------
    // Name resolution
    // ------------------------------------------------------------------------

    fn resolve_check(&self, name: &str) -> Option<(String, Arity)> {
        // A session registration under the literal name wins before alias
        // resolution kicks in.
        if let Some(spec) = self.session_checks.get(name) {
            return Some((name.to_string(), spec.arity));
        }
        let canonical = checks::canonical_check(name);
        if let Some(spec) = self.session_checks.get(canonical) {
            return Some((canonical.to_string(), spec.arity));
        }
        checks::lookup_check(canonical).map(|spec| (canonical.to_string(), spec.arity))
    }

    fn resolve_filter(&self, name: &str) -> Option<(String, Arity)> {
        if let Some(spec) = self.session_filters.get(name) {
            return Some((name.to_string(), spec.arity));
        }
        let canonical = checks::canonical_filter(name);
        if let Some(spec) = self.session_filters.get(canonical) {
            return Some((canonical.to_string(), spec.arity));
        }
        checks::lookup_filter(canonical).map(|spec| (canonical.to_string(), spec.arity))
    }

    fn check_spec(&self, name: &str) -> Option<CheckSpec> {
        self.session_checks
            .get(name)
            .cloned()
            .or_else(|| checks::lookup_check(name))
    }

    fn filter_spec(&self, name: &str) -> Option<FilterSpec> {
        self.session_filters
            .get(name)
            .cloned()
            .or_else(|| checks::lookup_filter(name))
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Runs the pipeline and returns the verdict: true iff no field recorded
    /// a failure. After the first call the verdict is fixed; re-validating
    /// requires a new session.
    pub fn validate(&mut self) -> bool {
        if self.state == State::Done {
            return self.verdict;
        }
        self.state = State::Running;

        let fields: Vec<String> = self
            .chain
            .fields()
            .filter(|f| self.in_scene(f))
            .map(String::from)
            .collect();

        let mut gated: Vec<String> = Vec::new();
        let mut writebacks: Vec<(FieldPath, Value)> = Vec::new();

        for field in &fields {
            let below_failed_gate = gated
                .iter()
                .any(|g| field.len() > g.len() && field.starts_with(g.as_str()) && field.as_bytes()[g.len()] == b'.');
            if below_failed_gate {
                continue;
            }
            let Some(entry) = self.chain.get(field).cloned() else {
                continue;
            };
            let stop = self.process_field(&entry, &mut gated, &mut writebacks);
            if stop {
                break;
            }
        }

        // Write-back of filtered values happens after all fields process.
        // Best-effort: a refusing binding is only observable via `set`.
        for (path, value) in writebacks {
            if self.source.settable() {
                let _ = self.source.write(&path, &value);
            }
        }

        self.state = State::Done;
        self.verdict = self.errors.is_empty();
        self.verdict
    }

    /// Runs one field's chain. Returns true when the stop-on-error policy
    /// halts the whole run.
    fn process_field(
        &mut self,
        entry: &FieldRules,
        gated: &mut Vec<String>,
        writebacks: &mut Vec<(FieldPath, Value)>,
    ) -> bool {
        let field = entry.field.as_str();
        let path = FieldPath::parse(field);
        let resolved = access::get_path(&self.working, &path);
        let found = resolved.found;
        let raw = resolved.value.clone();
        let mut value = resolved.value;
        let mut failed = false;
        let mut required_failed = false;

        // Filters transform the working value in declared order. A missing
        // or nil-gated field has nothing to transform.
        if found {
            for rule in entry.filters() {
                let Some(spec) = self.filter_spec(rule.name()) else {
                    continue;
                };
                match spec.filter.call(&value, &rule.arg_values()) {
                    Ok(next) => value = next,
                    Err(_) => {
                        let display = self.display_key(field);
                        let msg = match rule.message().or_else(|| self.bag.get(rule.name())) {
                            Some(text) => text.to_string(),
                            None => messages::render(
                                FILTER_TEMPLATE,
                                self.trans.display(field, &display),
                                &[Value::Str(rule.name().to_string())],
                            ),
                        };
                        self.errors.push(&display, rule.name(), msg);
                        failed = true;
                        break;
                    }
                }
            }
        }
        if failed {
            // A broken filter poisons the field; its validators never run.
            return self.opts.stop_on_error;
        }

        let empty = !found || value.is_empty();

        for rule in entry.validators() {
            let is_required = rule.name() == "required";
            if !is_required && empty && rule.skip_empty(self.opts.skip_empty) {
                continue;
            }
            let args = rule.arg_values();
            let pass = if is_required {
                !value.is_empty()
            } else {
                match self.check_spec(rule.name()) {
                    Some(spec) => spec.check.call(&value, &args),
                    None => continue,
                }
            };
            if !pass {
                let display = self.display_key(field);
                let msg = messages::resolve(
                    &self.bag,
                    &self.opts.messages,
                    &self.trans,
                    field,
                    &display,
                    rule.name(),
                    rule.message(),
                    &args,
                );
                self.errors.push(&display, rule.name(), msg);
                failed = true;
                required_failed |= is_required;
                if self.opts.stop_on_error {
                    return true;
                }
            }
        }

        if failed {
            if required_failed {
                // A failed gating rule stops traversal beneath this path.
                gated.push(field.to_string());
            }
            return false;
        }

        // Success: project the (possibly filtered) value into safe data and
        // stage write-back for mutable bindings.
        let display = self.display_key(field);
        self.safe.insert(display, value.clone());
        if found && value != raw {
            self.working = access::set_path(&self.working, &path, value.clone());
            writebacks.push((path, value));
        }
        false
    }

    fn in_scene(&self, field: &str) -> bool {
        match &self.scene {
            None => true,
            Some(name) => self
                .scenes
                .get(name)
                .map(|fields| fields.iter().any(|f| f == field))
                .unwrap_or(true),
        }
    }

    fn display_key(&self, field: &str) -> String {
        match self.opts.field_tag {
            FieldTag::Alias => self
                .aliases
                .get(field)
                .cloned()
                .unwrap_or_else(|| field.to_string()),
            FieldTag::Ident => field.to_string(),
        }
    }

    // ------------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------------

    /// Whether the verdict is fixed.
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// The failures collected by the last run.
    pub fn errors(&self) -> &ErrorCollection {
        &self.errors
    }

    /// The filtered projection of passing fields, keyed by display name.
    pub fn safe_data(&self) -> &ValueMap {
        &self.safe
    }

    /// One field's entry in the safe projection.
    pub fn safe_val(&self, field: &str) -> Option<&Value> {
        self.safe.get(field)
    }

    /// The field's current value in the working tree (filtered values and
    /// explicit sets included). `None` when the path does not resolve.
    pub fn raw(&self, field: &str) -> Option<Value> {
        let resolved = access::get_path(&self.working, &FieldPath::parse(field));
        resolved.found.then_some(resolved.value)
    }

    /// Writes a value into the underlying input. Requires an addressable
    /// binding; the destination performs its own type conversion, so an
    /// integer widens into a float field while an unconvertible value
    /// reports `ConvertFailed`.
    pub fn set(&mut self, field: &str, value: Value) -> Result<(), ErrorKind> {
        if !self.source.settable() {
            return Err(ErrorKind::NotSettable);
        }
        let path = FieldPath::parse(field);
        if matches!(self.source, Source::RecordMut(_)) {
            let resolved = access::get_path(&self.working, &path);
            if !resolved.found && !resolved.nil_parent {
                return Err(ErrorKind::UnknownField);
            }
        }
        let stored = self.source.write(&path, &value)?;
        self.working = access::set_path(&self.working, &path, stored);
        Ok(())
    }
}
