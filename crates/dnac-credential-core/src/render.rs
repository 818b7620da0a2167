//! Injector rendering
//!
//! Reference implementation of the platform's injector contract: every
//! variable in the mapping receives the non-empty value of the field its
//! template names. Anything else (undeclared reference, missing or empty
//! value, unsupported template) fails closed with a [`RenderError`] instead
//! of exporting an empty variable.
//!
//! Secret values are carried as [`SecretString`] and are never written to
//! logs or `Debug`/`Display` output.

use indexmap::IndexMap;
use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

use crate::error::Result;
use crate::inventory::EnvLookup;
use crate::model::{CredentialDefinition, InjectorMapping};
use crate::redact::REDACTED;
use crate::template::{Template, TemplateError};
use crate::validation::Validator;

/// Rendering failures; none of them carries a field value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("'{variable}' references undeclared field '{field}'")]
    UndeclaredField { variable: String, field: String },

    #[error("no value supplied for field '{field}' required by '{variable}'")]
    MissingValue { variable: String, field: String },

    #[error("field '{field}' is empty; refusing to inject an empty '{variable}'")]
    EmptyValue { variable: String, field: String },

    #[error("template for '{variable}' is invalid: {source}")]
    Template {
        variable: String,
        #[source]
        source: TemplateError,
    },
}

/// A credential or environment value, secret or not
pub enum CredentialValue {
    Plain(String),
    Secret(SecretString),
}

impl CredentialValue {
    pub fn new(value: impl Into<String>, secret: bool) -> Self {
        let value = value.into();
        if secret {
            CredentialValue::Secret(SecretString::new(value))
        } else {
            CredentialValue::Plain(value)
        }
    }

    /// The cleartext value
    pub fn expose(&self) -> &str {
        match self {
            CredentialValue::Plain(value) => value,
            CredentialValue::Secret(value) => value.expose_secret(),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, CredentialValue::Secret(_))
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialValue::Plain(value) => f.debug_tuple("Plain").field(value).finish(),
            CredentialValue::Secret(_) => f.debug_tuple("Secret").field(&REDACTED).finish(),
        }
    }
}

impl fmt::Display for CredentialValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialValue::Plain(value) => write!(f, "{}", value),
            CredentialValue::Secret(_) => write!(f, "{}", REDACTED),
        }
    }
}

/// Values an operator filled into a credential of this type
#[derive(Debug, Default)]
pub struct CredentialInputs {
    values: BTreeMap<String, CredentialValue>,
}

impl CredentialInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap plain values, marking those the definition declares secret
    pub fn from_values<I, K, V>(definition: &CredentialDefinition, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut inputs = Self::new();
        for (id, value) in values {
            let id = id.into();
            let secret = definition.is_secret(&id);
            inputs.insert(id, value, secret);
        }
        inputs
    }

    pub fn insert(&mut self, id: impl Into<String>, value: impl Into<String>, secret: bool) {
        self.values.insert(id.into(), CredentialValue::new(value, secret));
    }

    pub fn get(&self, id: &str) -> Option<&CredentialValue> {
        self.values.get(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Environment produced for a job run
#[derive(Debug, Default)]
pub struct RenderedEnvironment {
    vars: IndexMap<String, CredentialValue>,
}

impl RenderedEnvironment {
    pub fn get(&self, variable: &str) -> Option<&CredentialValue> {
        self.vars.get(variable)
    }

    /// Cleartext value of `variable`
    pub fn expose(&self, variable: &str) -> Option<&str> {
        self.vars.get(variable).map(CredentialValue::expose)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CredentialValue)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Cleartext of every secret variable, for scrubbing
    pub fn secret_values(&self) -> Vec<&str> {
        self.vars
            .values()
            .filter(|v| v.is_secret())
            .map(CredentialValue::expose)
            .collect()
    }

    /// `export NAME='value'` lines; secrets are masked unless `reveal`
    pub fn to_shell_exports(&self, reveal: bool) -> String {
        self.vars
            .iter()
            .map(|(name, value)| {
                let shown = if reveal { value.expose().to_string() } else { value.to_string() };
                format!("export {}={}", name, shell_quote(&shown))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Name-to-value map; secrets are masked unless `reveal`
    pub fn to_map(&self, reveal: bool) -> IndexMap<String, String> {
        self.vars
            .iter()
            .map(|(name, value)| {
                let shown = if reveal { value.expose().to_string() } else { value.to_string() };
                (name.clone(), shown)
            })
            .collect()
    }
}

impl fmt::Display for RenderedEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.vars {
            writeln!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}

impl EnvLookup for RenderedEnvironment {
    fn lookup(&self, name: &str) -> Option<String> {
        self.expose(name).map(str::to_string)
    }
}

fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Renders an injector mapping against credential inputs
pub struct InjectorRenderer<'a> {
    definition: &'a CredentialDefinition,
    injectors: &'a InjectorMapping,
}

impl<'a> InjectorRenderer<'a> {
    pub fn new(definition: &'a CredentialDefinition, injectors: &'a InjectorMapping) -> Self {
        Self {
            definition,
            injectors,
        }
    }

    /// Build a renderer only if the documents pass validation
    pub fn checked(
        definition: &'a CredentialDefinition,
        injectors: &'a InjectorMapping,
        validator: &Validator,
    ) -> Result<Self> {
        validator.ensure_valid(definition, Some(injectors))?;
        Ok(Self::new(definition, injectors))
    }

    /// Render every variable of the mapping
    pub fn render(&self, inputs: &CredentialInputs) -> std::result::Result<RenderedEnvironment, RenderError> {
        let mut vars = IndexMap::with_capacity(self.injectors.env.len());

        for (variable, source) in &self.injectors.env {
            let template = Template::parse(source).map_err(|source| RenderError::Template {
                variable: variable.clone(),
                source,
            })?;

            let mut secret = false;
            let rendered = template.render(|field| {
                if !self.definition.is_declared(field) {
                    return Err(RenderError::UndeclaredField {
                        variable: variable.clone(),
                        field: field.to_string(),
                    });
                }
                let value = inputs.get(field).ok_or_else(|| RenderError::MissingValue {
                    variable: variable.clone(),
                    field: field.to_string(),
                })?;
                if value.is_empty() {
                    return Err(RenderError::EmptyValue {
                        variable: variable.clone(),
                        field: field.to_string(),
                    });
                }
                secret |= value.is_secret() || self.definition.is_secret(field);
                Ok(value.expose().to_string())
            })?;

            if rendered.is_empty() {
                return Err(RenderError::EmptyValue {
                    variable: variable.clone(),
                    field: String::new(),
                });
            }

            debug!(variable = %variable, secret, "injector variable rendered");
            vars.insert(variable.clone(), CredentialValue::new(rendered, secret));
        }

        info!(variables = vars.len(), "injector environment rendered");
        Ok(RenderedEnvironment { vars })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CredentialType, Variant};

    fn inputs(host: &str, username: &str, password: &str) -> CredentialInputs {
        let ct = CredentialType::builtin(Variant::Standard);
        CredentialInputs::from_values(
            &ct.inputs,
            [("host", host), ("username", username), ("password", password)],
        )
    }

    #[test]
    fn test_render_contract() {
        let ct = CredentialType::builtin(Variant::Standard);
        let env = InjectorRenderer::new(&ct.inputs, &ct.injectors)
            .render(&inputs("10.0.0.5", "admin", "s3cr3t"))
            .unwrap();

        assert_eq!(env.len(), 3);
        assert_eq!(env.expose("DNAC_HOST"), Some("10.0.0.5"));
        assert_eq!(env.expose("DNAC_USERNAME"), Some("admin"));
        assert_eq!(env.expose("DNAC_PASSWORD"), Some("s3cr3t"));
        assert!(env.get("DNAC_PASSWORD").unwrap().is_secret());
        assert!(!env.get("DNAC_HOST").unwrap().is_secret());
    }

    #[test]
    fn test_display_and_debug_mask_secrets() {
        let ct = CredentialType::builtin(Variant::Legacy);
        let env = InjectorRenderer::new(&ct.inputs, &ct.injectors)
            .render(&inputs("dnac.example.com", "admin", "s3cr3t"))
            .unwrap();

        let shown = format!("{} {:?}", env, env);
        assert!(!shown.contains("s3cr3t"));
        assert!(shown.contains("DNAC_PASSWORD=[REDACTED]"));
        assert!(shown.contains("dnac.example.com"));
    }

    #[test]
    fn test_shell_exports() {
        let ct = CredentialType::builtin(Variant::Standard);
        let env = InjectorRenderer::new(&ct.inputs, &ct.injectors)
            .render(&inputs("10.0.0.5", "o'brien", "s3cr3t"))
            .unwrap();

        let masked = env.to_shell_exports(false);
        assert!(masked.contains("export DNAC_PASSWORD='[REDACTED]'"));
        assert!(masked.contains(r"export DNAC_USERNAME='o'\''brien'"));

        let revealed = env.to_shell_exports(true);
        assert!(revealed.contains("export DNAC_PASSWORD='s3cr3t'"));
    }

    #[test]
    fn test_missing_value_fails_closed() {
        let ct = CredentialType::builtin(Variant::Standard);
        let mut partial = CredentialInputs::new();
        partial.insert("host", "10.0.0.5", false);
        partial.insert("password", "s3cr3t", true);

        let err = InjectorRenderer::new(&ct.inputs, &ct.injectors)
            .render(&partial)
            .unwrap_err();
        assert_eq!(
            err,
            RenderError::MissingValue {
                variable: "DNAC_USERNAME".to_string(),
                field: "username".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_value_fails_closed() {
        let ct = CredentialType::builtin(Variant::Standard);
        let err = InjectorRenderer::new(&ct.inputs, &ct.injectors)
            .render(&inputs("10.0.0.5", "admin", ""))
            .unwrap_err();
        assert!(matches!(err, RenderError::EmptyValue { ref variable, .. } if variable == "DNAC_PASSWORD"));
    }

    #[test]
    fn test_undeclared_reference_fails_closed() {
        let ct = CredentialType::builtin(Variant::Standard);
        let injectors = InjectorMapping::contract().with_var("DNAC_HOST", "{{ hostname }}");
        let err = InjectorRenderer::new(&ct.inputs, &injectors)
            .render(&inputs("10.0.0.5", "admin", "s3cr3t"))
            .unwrap_err();
        assert!(matches!(err, RenderError::UndeclaredField { ref field, .. } if field == "hostname"));
    }

    #[test]
    fn test_error_never_contains_value() {
        let ct = CredentialType::builtin(Variant::Standard);
        let injectors = InjectorMapping::contract().with_var("DNAC_PASSWORD", "{{ password | b64 }}");
        let err = InjectorRenderer::new(&ct.inputs, &injectors)
            .render(&inputs("10.0.0.5", "admin", "s3cr3t"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Template { .. }));
        assert!(!err.to_string().contains("s3cr3t"));
    }

    #[test]
    fn test_checked_rejects_invalid_definition() {
        let mut ct = CredentialType::builtin(Variant::Standard);
        ct.inputs.fields[2].secret = false;
        let validator = Validator::default();
        assert!(InjectorRenderer::checked(&ct.inputs, &ct.injectors, &validator).is_err());
    }

    #[test]
    fn test_secret_propagates_through_composite_template() {
        let ct = CredentialType::builtin(Variant::Standard);
        let injectors = InjectorMapping::contract().with_var("DNAC_AUTH", "{{ username }}:{{ password }}");
        let env = InjectorRenderer::new(&ct.inputs, &injectors)
            .render(&inputs("10.0.0.5", "admin", "s3cr3t"))
            .unwrap();
        assert!(env.get("DNAC_AUTH").unwrap().is_secret());
        assert_eq!(env.secret_values().len(), 2);
    }

    #[test]
    fn test_env_lookup() {
        let ct = CredentialType::builtin(Variant::Standard);
        let env = InjectorRenderer::new(&ct.inputs, &ct.injectors)
            .render(&inputs("10.0.0.5", "admin", "s3cr3t"))
            .unwrap();
        assert_eq!(env.lookup("DNAC_USERNAME"), Some("admin".to_string()));
        assert_eq!(env.lookup("HOME"), None);
    }
}
