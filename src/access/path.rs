//! A canonical, type-safe representation of a dotted field path.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldPath(pub Vec<String>);

impl FieldPath {
    pub fn parse(raw: &str) -> Self {
        Self(raw.split('.').map(String::from).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}
