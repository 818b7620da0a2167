//! Credential input field descriptors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Input types the platform accepts for custom credential fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Boolean,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Boolean => write!(f, "boolean"),
        }
    }
}

/// A single entry of the `fields` list
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field identifier, referenced by `required` and injector templates
    pub id: String,
    /// Input type
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Label shown in the credential form
    pub label: String,
    /// Whether the platform stores the value encrypted and masks it
    #[serde(default, skip_serializing_if = "is_false")]
    pub secret: bool,
    /// Optional help text shown next to the input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl FieldDescriptor {
    /// Create a plain string field
    pub fn string(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type: FieldType::String,
            label: label.into(),
            secret: false,
            help_text: None,
        }
    }

    /// Create a secret string field
    pub fn secret(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            secret: true,
            ..Self::string(id, label)
        }
    }

    /// Attach help text
    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }
}
