//! Injector configuration (`env` mapping)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::CONTRACT_BINDINGS;
use crate::template::{Template, TemplateError};

/// Mapping from environment variable name to a field template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectorMapping {
    #[serde(default)]
    pub env: IndexMap<String, String>,
}

impl InjectorMapping {
    /// The fixed DNA Center mapping
    pub fn contract() -> Self {
        let env = CONTRACT_BINDINGS
            .iter()
            .map(|(var, field)| (var.to_string(), format!("{{{{ {} }}}}", field)))
            .collect();
        Self { env }
    }

    /// Add or replace a variable
    pub fn with_var(mut self, variable: impl Into<String>, template: impl Into<String>) -> Self {
        self.env.insert(variable.into(), template.into());
        self
    }

    pub fn template(&self, variable: &str) -> Option<&str> {
        self.env.get(variable).map(String::as_str)
    }

    /// Parse every template, in mapping order
    pub fn parsed(&self) -> Vec<(&str, Result<Template, TemplateError>)> {
        self.env
            .iter()
            .map(|(var, tpl)| (var.as_str(), Template::parse(tpl)))
            .collect()
    }

    /// Field ids referenced by templates that parse
    pub fn references(&self) -> BTreeSet<String> {
        self.parsed()
            .into_iter()
            .filter_map(|(_, tpl)| tpl.ok())
            .flat_map(|tpl| {
                tpl.references()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
