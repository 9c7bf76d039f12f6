pub use crate::errors::{ConfigError, ErrorCollection, ErrorKind, FieldError};

pub mod access;
pub mod checks;
pub mod errors;
pub mod messages;
pub mod options;
pub mod rules;
pub mod session;
pub mod value;

pub use crate::access::{FieldPath, HasMessages, HasRules, HasTranslations, Record};
pub use crate::options::{config, reset_option, FieldTag, Options};
pub use crate::rules::{Rule, RuleChain};
pub use crate::session::Validation;
pub use crate::value::{Value, ValueMap};
