use sieve::{
    ErrorKind, HasMessages, HasRules, HasTranslations, Record, Validation, Value, ValueMap,
};

// ---
// Test records
// ---

#[derive(Debug, Clone, PartialEq)]
struct FloatHolder {
    a: f64,
}

impl Record for FloatHolder {
    fn capture(&self) -> ValueMap {
        ValueMap::unit("a".to_string(), Value::Float(self.a))
    }

    fn apply(&mut self, field: &str, value: &Value) -> Result<Value, ErrorKind> {
        match field {
            "a" => {
                let f = value.to_float().ok_or(ErrorKind::ConvertFailed)?;
                self.a = f;
                Ok(Value::Float(f))
            }
            _ => Err(ErrorKind::UnknownField),
        }
    }
}

impl HasRules for FloatHolder {
    fn rules() -> &'static [(&'static str, &'static str)] {
        &[("a", "float")]
    }
}
impl HasMessages for FloatHolder {}
impl HasTranslations for FloatHolder {}

#[derive(Debug, Clone)]
struct SmsRequest {
    country_code: String,
    phone: String,
    kind: String,
}

impl Record for SmsRequest {
    fn capture(&self) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("country_code".into(), Value::Str(self.country_code.clone()));
        map.insert("phone".into(), Value::Str(self.phone.clone()));
        map.insert("kind".into(), Value::Str(self.kind.clone()));
        map
    }

    fn apply(&mut self, field: &str, value: &Value) -> Result<Value, ErrorKind> {
        let text = value.as_str().ok_or(ErrorKind::ConvertFailed)?.to_string();
        match field {
            "country_code" => self.country_code = text,
            "phone" => self.phone = text,
            "kind" => self.kind = text,
            _ => return Err(ErrorKind::UnknownField),
        }
        Ok(value.clone())
    }
}

impl HasRules for SmsRequest {
    fn rules() -> &'static [(&'static str, &'static str)] {
        &[
            ("country_code", "required"),
            ("phone", "required|str_num"),
            ("kind", "required|in:register,forget_password,reset_password"),
        ]
    }

    fn filter_rules() -> &'static [(&'static str, &'static str)] {
        &[("country_code", "trim|lower"), ("phone", "trim")]
    }

    fn aliases() -> &'static [(&'static str, &'static str)] {
        &[("country_code", "countryCode")]
    }
}
impl HasMessages for SmsRequest {}
impl HasTranslations for SmsRequest {}

#[derive(Debug, Clone)]
struct OrgInfo {
    company: String,
}

#[derive(Debug, Clone)]
struct Inner2 {
    org: Option<OrgInfo>,
}

#[derive(Debug, Clone)]
struct Profile {
    name: String,
    in2: Option<Inner2>,
}

impl Record for Profile {
    fn capture(&self) -> ValueMap {
        let mut map = ValueMap::new();
        map.insert("Name".into(), Value::Str(self.name.clone()));
        let in2 = match &self.in2 {
            None => Value::Nil,
            Some(inner) => {
                let org = match &inner.org {
                    None => Value::Nil,
                    Some(org) => Value::Map(ValueMap::unit(
                        "Company".to_string(),
                        Value::Str(org.company.clone()),
                    )),
                };
                Value::Map(ValueMap::unit("Org".to_string(), org))
            }
        };
        map.insert("In2".into(), in2);
        map
    }

    fn apply(&mut self, field: &str, value: &Value) -> Result<Value, ErrorKind> {
        match field {
            "Name" => {
                self.name = value.as_str().ok_or(ErrorKind::ConvertFailed)?.to_string();
                Ok(value.clone())
            }
            "In2.Org.Company" => {
                let company = value.as_str().ok_or(ErrorKind::ConvertFailed)?;
                let org = self
                    .in2
                    .as_mut()
                    .and_then(|inner| inner.org.as_mut())
                    .ok_or(ErrorKind::NotSettable)?;
                org.company = company.to_string();
                Ok(value.clone())
            }
            _ => Err(ErrorKind::UnknownField),
        }
    }
}

impl HasRules for Profile {
    fn rules() -> &'static [(&'static str, &'static str)] {
        &[
            ("Name", "required"),
            ("In2.Org", "required"),
            ("In2.Org.Company", "required|minLen:2"),
        ]
    }
}
impl HasMessages for Profile {}
impl HasTranslations for Profile {}

// ---
// Explicit set: addressability and conversion
// ---

#[test]
fn by_value_binding_refuses_set() {
    let holder = FloatHolder { a: 123.0 };
    let mut v = Validation::from_record(&holder).unwrap();
    assert!(v.validate());
    assert_eq!(v.safe_val("a"), Some(&Value::Float(123.0)));
    assert_eq!(v.raw("a"), Some(Value::Float(123.0)));

    assert_eq!(
        v.set("a", Value::Float(234.0)),
        Err(ErrorKind::NotSettable)
    );
    assert_eq!(v.set("b", Value::Int(234)), Err(ErrorKind::NotSettable));
}

#[test]
fn mutable_binding_sets_with_numeric_widening() {
    let mut holder = FloatHolder { a: 123.0 };
    {
        let mut v = Validation::from_record_mut(&mut holder).unwrap();
        assert!(v.validate());

        v.set("a", Value::Float(234.0)).unwrap();
        assert_eq!(v.raw("a"), Some(Value::Float(234.0)));

        // an integer widens into the float field
        v.set("a", Value::Int(23)).unwrap();
        assert_eq!(v.raw("a"), Some(Value::Float(23.0)));

        // unconvertible text reports the conversion failure
        assert_eq!(
            v.set("a", Value::Str("abc".into())),
            Err(ErrorKind::ConvertFailed)
        );
        // a field the record does not have
        assert_eq!(v.set("b", Value::Int(1)), Err(ErrorKind::UnknownField));
    }
    assert_eq!(holder.a, 23.0);
}

// ---
// Filter write-back into the original record
// ---

#[test]
fn filtered_values_write_back_into_a_mutable_record() {
    let mut req = SmsRequest {
        country_code: " ABcd   ".into(),
        phone: "13677778888  ".into(),
        kind: "register".into(),
    };
    {
        let mut v = Validation::from_record_mut(&mut req).unwrap();
        assert!(v.validate());
        let safe = v.safe_data();
        assert_eq!(safe.get("country_code"), Some(&Value::Str("abcd".into())));
        assert_eq!(safe.get("phone"), Some(&Value::Str("13677778888".into())));
    }
    assert_eq!(req.country_code, "abcd");
    assert_eq!(req.phone, "13677778888");
}

#[test]
fn shared_record_binding_filters_but_never_mutates() {
    let req = SmsRequest {
        country_code: " ABcd   ".into(),
        phone: "13677778888  ".into(),
        kind: "register".into(),
    };
    let mut v = Validation::from_record(&req).unwrap();
    assert!(v.validate());
    assert_eq!(v.safe_val("country_code"), Some(&Value::Str("abcd".into())));
    drop(v);
    // the original is untouched through a shared borrow
    assert_eq!(req.country_code, " ABcd   ");
}

#[test]
fn alias_naming_keys_errors_and_safe_data() {
    let req = SmsRequest {
        country_code: "  ".into(),
        phone: "13677778888".into(),
        kind: "register".into(),
    };
    let mut v = Validation::from_record(&req).unwrap();
    v.with_options(|opts| opts.field_tag = sieve::FieldTag::Alias);
    assert!(!v.validate());
    // trim left nothing, so required fails under the alias key
    assert!(v.errors().field_one("countryCode").is_some());
    assert!(v.errors().field_one("country_code").is_none());
}

// ---
// Nested records and nil gating
// ---

#[test]
fn populated_nested_record_validates_leaf_paths() {
    let profile = Profile {
        name: "sieve".into(),
        in2: Some(Inner2 {
            org: Some(OrgInfo {
                company: "Acme".into(),
            }),
        }),
    };
    let mut v = Validation::from_record(&profile).unwrap();
    assert!(v.validate());
    assert_eq!(
        v.safe_val("In2.Org.Company"),
        Some(&Value::Str("Acme".into()))
    );
}

#[test]
fn nil_nested_record_reports_once_and_gates_the_subtree() {
    let profile = Profile {
        name: "sieve".into(),
        in2: Some(Inner2 { org: None }),
    };
    let mut v = Validation::from_record(&profile).unwrap();
    assert!(!v.validate());
    // one failure at the pointer's own path; nothing beneath it is visited
    assert_eq!(v.errors().len(), 1);
    let err = v.errors().field_one("In2.Org").unwrap();
    assert_eq!(err.rule, "required");
    assert!(v.errors().field_one("In2.Org.Company").is_none());
}

#[test]
fn nil_link_without_a_parent_rule_fails_at_the_leaf_path() {
    let profile = Profile {
        name: "sieve".into(),
        in2: None,
    };
    let mut v = Validation::from_record(&profile).unwrap();
    assert!(!v.validate());
    // In2.Org's own resolution crosses the nil In2 pointer
    let err = v.errors().field_one("In2.Org").unwrap();
    assert_eq!(err.rule, "required");
    assert!(v.errors().field_one("In2.Org.Company").is_none());
}

#[test]
fn nested_leaf_write_back() {
    let mut profile = Profile {
        name: "sieve".into(),
        in2: Some(Inner2 {
            org: Some(OrgInfo {
                company: "Acme".into(),
            }),
        }),
    };
    {
        let mut v = Validation::from_record_mut(&mut profile).unwrap();
        assert!(v.validate());
        v.set("In2.Org.Company", Value::Str("Initech".into())).unwrap();
        assert_eq!(
            v.raw("In2.Org.Company"),
            Some(Value::Str("Initech".into()))
        );
    }
    assert_eq!(profile.in2.unwrap().org.unwrap().company, "Initech");
}
