use im::HashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The map form shared by mapping inputs, nested records, and safe data.
pub type ValueMap = HashMap<String, Value>;

/// A dynamic value flowing through the validation pipeline.
///
/// `Int`, `Uint` and `Float` are distinct variants on purpose: equality and
/// membership checks are variant-sensitive, so `Uint(2)` is not equal to
/// `Int(2)` even though they compare numerically equal. Use the explicit
/// coercions (`to_int`, `to_float`, ...) when relaxed matching is wanted.
///
/// # Examples
///
/// ```rust
/// use sieve::Value;
/// let n = Value::Int(42);
/// assert_eq!(n.type_name(), "Int");
/// let s = Value::Str("hello".to_string());
/// assert_eq!(s.type_name(), "Str");
/// let nil = Value::default();
/// assert!(nil.is_nil());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(ValueMap),
}

impl Value {
    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Uint(_) => "Uint",
            Value::Float(_) => "Float",
            Value::Str(_) => "Str",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
        }
    }

    /// Returns true if the value is Nil.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Emptiness as the pipeline sees it: nil, the empty string, an empty
    /// collection, or a zero value.
    ///
    /// `Bool(false)` counts as empty (it is the boolean zero value), so
    /// `required` rejects it. Callers validating genuine booleans should use
    /// the `bool` type rule instead of `required`.
    ///
    /// ```rust
    /// use sieve::Value;
    /// assert!(Value::Int(0).is_empty());
    /// assert!(Value::Str(String::new()).is_empty());
    /// assert!(!Value::Int(7).is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Uint(n) => *n == 0,
            Value::Float(n) => *n == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
        }
    }

    /// Returns the contained string slice if this is a Str value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the contained bool if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the contained map if this is a Map value.
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Coerces to a signed integer without losing information.
    ///
    /// Accepts `Int`, in-range `Uint`, `Float` with no fractional part, and
    /// strings that parse as integers. Everything else is `None` rather than
    /// a guess.
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Uint(n) => i64::try_from(*n).ok(),
            Value::Float(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Some(*n as i64),
            Value::Str(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }

    /// Coerces to an unsigned integer without losing information.
    pub fn to_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(n) => Some(*n),
            Value::Int(n) => u64::try_from(*n).ok(),
            Value::Float(n) if n.fract() == 0.0 && *n >= 0.0 && *n < u64::MAX as f64 => {
                Some(*n as u64)
            }
            Value::Str(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        }
    }

    /// Coerces to a float. Integer sources widen; numeric strings parse.
    ///
    /// ```rust
    /// use sieve::Value;
    /// assert_eq!(Value::Int(23).to_float(), Some(23.0));
    /// assert_eq!(Value::Str("1.5".into()).to_float(), Some(1.5));
    /// assert_eq!(Value::Str("abc".into()).to_float(), None);
    /// ```
    pub fn to_float(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Int(n) => Some(*n as f64),
            Value::Uint(n) => Some(*n as f64),
            Value::Str(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// Parses a raw rule-argument token into its natural variant:
    /// integer-looking tokens become `Int`, decimal tokens become `Float`,
    /// `true`/`false` become `Bool`, anything else stays `Str`.
    pub fn natural(token: &str) -> Value {
        if let Ok(n) = token.parse::<i64>() {
            return Value::Int(n);
        }
        if let Ok(n) = token.parse::<f64>() {
            return Value::Float(n);
        }
        match token {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Str(token.to_string()),
        }
    }

    // ------------------------------------------------------------------------
    // Display formatting helpers
    // ------------------------------------------------------------------------

    fn fmt_list(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
        write!(f, "[")?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        write!(f, "]")
    }

    fn fmt_map(f: &mut fmt::Formatter<'_>, map: &ValueMap) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for (k, v) in map.iter() {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
            first = false;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Uint(n) => write!(f, "{}", n),
            Value::Float(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Str(s) => write!(f, "{}", s),
            Value::List(items) => Value::fmt_list(f, items),
            Value::Map(map) => Value::fmt_map(f, map),
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Uint(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(map)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}
