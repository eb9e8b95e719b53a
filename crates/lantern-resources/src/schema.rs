//! Declarative option schemas for hints.
//!
//! Each hint publishes an [`OptionsSchema`] in its meta descriptor; the
//! analyzer validates user-supplied options against it at creation time, so
//! a typo in `lantern.toml` fails before any scan instead of being silently
//! ignored mid-run.

use serde_json::Value;
use std::fmt;

/// The accepted type of one option field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `true` / `false`
    Bool,
    /// Integer number
    Integer,
    /// Any number
    Number,
    /// A string
    String,
    /// A list of strings
    StringList,
}

impl FieldKind {
    fn describes(self, value: &Value) -> bool {
        match self {
            Self::Bool => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::String => value.is_string(),
            Self::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::Bool => "a boolean",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::String => "a string",
            Self::StringList => "a list of strings",
        }
    }
}

/// One declared option field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Field name as it appears in the options table
    pub name: &'static str,
    /// Accepted type
    pub kind: FieldKind,
    /// Whether the field must be present
    pub required: bool,
}

/// One validation failure, attributable to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    /// The offending field, or the field that is missing
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "option '{}': {}", self.field, self.message)
    }
}

/// The declared option surface of a hint.
///
/// Unknown keys are rejected by default; a hint that forwards options to
/// something else can opt out with [`OptionsSchema::allow_unknown`].
#[derive(Debug, Clone, Default)]
pub struct OptionsSchema {
    fields: Vec<FieldSpec>,
    allow_unknown: bool,
}

impl OptionsSchema {
    /// A schema accepting no options at all.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Declare an optional field.
    #[must_use]
    pub fn field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: false,
        });
        self
    }

    /// Declare a required field.
    #[must_use]
    pub fn required_field(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldSpec {
            name,
            kind,
            required: true,
        });
        self
    }

    /// Accept keys the schema does not declare.
    #[must_use]
    pub fn allow_unknown(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    /// Validate user-supplied options.
    ///
    /// `Value::Null` means "no options given" and passes unless a required
    /// field exists. Anything other than `Null` or an object is itself a
    /// violation.
    pub fn validate(&self, options: &Value) -> Result<(), Vec<SchemaViolation>> {
        let mut violations = Vec::new();

        let map = match options {
            Value::Null => {
                for spec in self.fields.iter().filter(|s| s.required) {
                    violations.push(SchemaViolation {
                        field: spec.name.to_string(),
                        message: "required option is missing".to_string(),
                    });
                }
                return if violations.is_empty() {
                    Ok(())
                } else {
                    Err(violations)
                };
            }
            Value::Object(map) => map,
            other => {
                return Err(vec![SchemaViolation {
                    field: String::new(),
                    message: format!("options must be a table, got {}", kind_name(other)),
                }]);
            }
        };

        for spec in &self.fields {
            match map.get(spec.name) {
                None if spec.required => violations.push(SchemaViolation {
                    field: spec.name.to_string(),
                    message: "required option is missing".to_string(),
                }),
                None => {}
                Some(value) if !spec.kind.describes(value) => violations.push(SchemaViolation {
                    field: spec.name.to_string(),
                    message: format!(
                        "expected {}, got {}",
                        spec.kind.expected(),
                        kind_name(value)
                    ),
                }),
                Some(_) => {}
            }
        }

        if !self.allow_unknown {
            for key in map.keys() {
                if !self.fields.iter().any(|s| s.name == key) {
                    violations.push(SchemaViolation {
                        field: key.clone(),
                        message: "unknown option".to_string(),
                    });
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a table",
    }
}
