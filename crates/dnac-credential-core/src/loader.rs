//! Document loading
//!
//! Credential documents can be authored as YAML (the platform's native
//! format), JSON or TOML. Every document is first parsed into a
//! `serde_json::Value` so the three formats share one code path.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::error::{CredentialError, Result};
use crate::model::{CredentialDefinition, CredentialType, InjectorMapping};

/// Supported document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Json => write!(f, "json"),
            DocumentFormat::Yaml => write!(f, "yaml"),
            DocumentFormat::Toml => write!(f, "toml"),
        }
    }
}

impl DocumentFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            "toml" => Ok(DocumentFormat::Toml),
            _ => Err(CredentialError::InvalidInput(format!(
                "Unsupported file format: {}. Supported formats: json, yaml, yml, toml",
                extension
            ))),
        }
    }

    /// Parse content in this format
    pub fn parse(&self, content: &str) -> Result<serde_json::Value> {
        match self {
            DocumentFormat::Json => serde_json::from_str(content)
                .map_err(|e| CredentialError::ParseError(format!("Invalid JSON: {}", e))),
            DocumentFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| CredentialError::ParseError(format!("Invalid YAML: {}", e))),
            DocumentFormat::Toml => {
                let toml_value: toml::Value = toml::from_str(content)
                    .map_err(|e| CredentialError::ParseError(format!("Invalid TOML: {}", e)))?;
                serde_json::to_value(toml_value)
                    .map_err(|e| CredentialError::ParseError(format!("Conversion error: {}", e)))
            }
        }
    }
}

/// Read a file and parse it according to its extension
pub fn read_value(path: &Path) -> Result<serde_json::Value> {
    let format = DocumentFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| {
        CredentialError::FileError(format!("Failed to read '{}': {}", path.display(), e))
    })?;
    debug!(path = %path.display(), %format, "loading document");
    format.parse(&content)
}

/// Deserialize a parsed document into `T`
pub fn from_value<T: DeserializeOwned>(value: serde_json::Value, what: &str) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| CredentialError::SchemaError(format!("Invalid {}: {}", what, e)))
}

/// Pick `key` out of a full credential type document, or use the document
/// itself when it is the stand-alone section
fn section(value: serde_json::Value, key: &str) -> serde_json::Value {
    match value {
        serde_json::Value::Object(mut map) if map.contains_key(key) => {
            map.remove(key).unwrap_or(serde_json::Value::Null)
        }
        other => other,
    }
}

/// Parse an input configuration from a document value
///
/// Accepts either the stand-alone `fields`/`required` document or a full
/// credential type document carrying it under `inputs`.
pub fn definition_from_value(value: serde_json::Value) -> Result<CredentialDefinition> {
    let inputs = section(value, "inputs");
    if !inputs.is_object() || inputs.get("fields").is_none() {
        return Err(CredentialError::SchemaError(
            "input configuration must contain a 'fields' list".to_string(),
        ));
    }
    from_value(inputs, "input configuration")
}

/// Parse an injector configuration from a document value
///
/// Accepts either the stand-alone `env` document or a full credential type
/// document carrying it under `injectors`.
pub fn injectors_from_value(value: serde_json::Value) -> Result<InjectorMapping> {
    let injectors = section(value, "injectors");
    if !injectors.is_object() || injectors.get("env").is_none() {
        return Err(CredentialError::SchemaError(
            "injector configuration must contain an 'env' mapping".to_string(),
        ));
    }
    from_value(injectors, "injector configuration")
}

/// Parse credential field values (`id: value`)
///
/// Strings are taken as written and booleans become `true`/`false`; nulls
/// are dropped so they count as missing. Numbers must be quoted, since the
/// parsed number may print differently (`1e3` as `1000.0`). Nested values
/// are rejected.
pub fn values_from_value(value: serde_json::Value) -> Result<IndexMap<String, String>> {
    let serde_json::Value::Object(map) = value else {
        return Err(CredentialError::SchemaError(
            "credential values must be a mapping of field id to value".to_string(),
        ));
    };

    let mut values = IndexMap::new();
    for (id, value) in map {
        let text = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s,
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(_) => {
                return Err(CredentialError::SchemaError(format!(
                    "value for field '{}' is a number; quote it so it is injected as written",
                    id
                )))
            }
            _ => {
                return Err(CredentialError::SchemaError(format!(
                    "value for field '{}' must be a scalar",
                    id
                )))
            }
        };
        values.insert(id, text);
    }
    Ok(values)
}

pub fn load_definition(path: &Path) -> Result<CredentialDefinition> {
    definition_from_value(read_value(path)?)
}

pub fn load_injectors(path: &Path) -> Result<InjectorMapping> {
    injectors_from_value(read_value(path)?)
}

pub fn load_credential_type(path: &Path) -> Result<CredentialType> {
    from_value(read_value(path)?, "credential type")
}

pub fn load_values(path: &Path) -> Result<IndexMap<String, String>> {
    values_from_value(read_value(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const INPUTS_YAML: &str = r#"
fields:
  - id: host
    type: string
    label: DNA Center Host
  - id: username
    type: string
    label: Username
  - id: password
    type: string
    label: Password
    secret: true
required:
  - host
  - username
  - password
"#;

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("a.YML")).unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(&PathBuf::from("a.json")).unwrap(),
            DocumentFormat::Json
        );
        assert!(DocumentFormat::from_path(&PathBuf::from("a.txt")).is_err());
    }

    #[test]
    fn test_definition_from_yaml() {
        let value = DocumentFormat::Yaml.parse(INPUTS_YAML).unwrap();
        let def = definition_from_value(value).unwrap();
        assert_eq!(def.fields.len(), 3);
        assert!(def.is_secret("password"));
    }

    #[test]
    fn test_definition_from_full_credential_type() {
        let doc = format!(
            "name: DNA Center\ninputs:\n{}\ninjectors:\n  env:\n    DNAC_HOST: '{{{{ host }}}}'\n",
            INPUTS_YAML
                .lines()
                .map(|l| format!("  {}", l))
                .collect::<Vec<_>>()
                .join("\n")
        );
        let value = DocumentFormat::Yaml.parse(&doc).unwrap();
        let def = definition_from_value(value.clone()).unwrap();
        assert_eq!(def.required.len(), 3);
        let injectors = injectors_from_value(value).unwrap();
        assert_eq!(injectors.template("DNAC_HOST"), Some("{{ host }}"));
    }

    #[test]
    fn test_definition_requires_fields() {
        let value = DocumentFormat::Yaml.parse("required: [host]").unwrap();
        assert!(matches!(
            definition_from_value(value),
            Err(CredentialError::SchemaError(_))
        ));
    }

    #[test]
    fn test_injectors_from_toml() {
        let value = DocumentFormat::Toml
            .parse("[env]\nDNAC_HOST = \"{{ host }}\"\n")
            .unwrap();
        let injectors = injectors_from_value(value).unwrap();
        assert_eq!(injectors.env.len(), 1);
    }

    #[test]
    fn test_values_conversion() {
        let value = serde_json::json!({
            "host": "10.0.0.5",
            "port": "443",
            "verify": false,
            "unset": null
        });
        let values = values_from_value(value).unwrap();
        assert_eq!(values["host"], "10.0.0.5");
        assert_eq!(values["port"], "443");
        assert_eq!(values["verify"], "false");
        assert!(!values.contains_key("unset"));
    }

    #[test]
    fn test_values_reject_unquoted_numbers() {
        let value = DocumentFormat::Yaml
            .parse("host: dnac.lab\nusername: admin\npassword: 90817263\n")
            .unwrap();
        let err = values_from_value(value).unwrap_err();
        assert!(matches!(err, CredentialError::SchemaError(_)));
        assert!(err.to_string().contains("'password'"));
        assert!(!err.to_string().contains("90817263"));

        let quoted = DocumentFormat::Yaml
            .parse("password: '1e3'\n")
            .unwrap();
        assert_eq!(values_from_value(quoted).unwrap()["password"], "1e3");
    }

    #[test]
    fn test_values_reject_nested() {
        let value = serde_json::json!({"host": ["a", "b"]});
        assert!(values_from_value(value).is_err());
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            DocumentFormat::Yaml.parse("fields: ["),
            Err(CredentialError::ParseError(_))
        ));
    }
}
