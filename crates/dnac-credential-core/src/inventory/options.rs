//! `dna_center.yml` inventory source options
//!
//! `host`, `username` and `password` fall back to the `DNAC_HOST`,
//! `DNAC_USERNAME` and `DNAC_PASSWORD` variables the credential injects.
//! Values written in the file take precedence over the environment.

use secrecy::{ExposeSecret, SecretString};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

use super::builder::KeyedGroup;
use super::env::EnvLookup;
use super::pagination::{page_plan, DeviceListQuery, DEFAULT_RECORD_LIMIT};
use super::InventoryError;
use crate::error::{CredentialError, Result};
use crate::loader;
use crate::model::{DNAC_HOST, DNAC_PASSWORD, DNAC_USERNAME};
use crate::redact::{SecretScrubber, REDACTED};

/// Plugin name the file must declare
pub const PLUGIN_NAME: &str = "dna_center";

/// File name suffix the inventory source accepts
pub const FILE_SUFFIX: &str = "dna_center.yml";

/// Device families fetched when none are configured
pub const DEFAULT_DEVICE_FAMILIES: [&str; 2] = ["Switches and Hubs", "Routers"];

/// Options exactly as written in the file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInventoryOptions {
    pub plugin: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub host: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub dnac_version: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "scalar_string")]
    pub password: Option<String>,
    pub validate_certs: Option<bool>,
    pub use_dnac_mgmt_int: Option<bool>,
    pub toplevel: Option<String>,
    pub api_record_limit: Option<u32>,
    pub hostname_filter: Option<String>,
    pub device_family: Option<Vec<String>>,
    pub location_name: Option<String>,
    pub keyed_groups: Option<Vec<KeyedGroup>>,
    pub strict: Option<bool>,
    /// Jinja expressions; read only so they can be rejected
    pub compose: Option<Value>,
    pub groups: Option<Value>,
}

/// Resolved inventory source options
#[derive(Debug)]
pub struct InventoryOptions {
    pub host: String,
    pub dnac_version: String,
    pub username: String,
    pub password: SecretString,
    pub validate_certs: bool,
    pub use_dnac_mgmt_int: bool,
    pub toplevel: Option<String>,
    pub api_record_limit: u32,
    pub hostname_filter: Option<String>,
    pub device_family: Vec<String>,
    pub location_name: Option<String>,
    pub keyed_groups: Vec<KeyedGroup>,
    pub strict: bool,
}

/// Printable view of [`InventoryOptions`] with the password masked
#[derive(Debug, Clone, Serialize)]
pub struct InventoryOptionsSummary {
    pub host: String,
    pub dnac_version: String,
    pub username: String,
    pub password: String,
    pub validate_certs: bool,
    pub use_dnac_mgmt_int: bool,
    pub toplevel: Option<String>,
    pub api_record_limit: u32,
    pub hostname_filter: Option<String>,
    pub device_family: Vec<String>,
    pub location_name: Option<String>,
    pub keyed_groups: Vec<KeyedGroup>,
    pub strict: bool,
    pub base_url: String,
}

/// Whether the inventory source would accept this file
pub fn verify_file(path: &Path) -> bool {
    path.to_str()
        .map(|p| p.ends_with(FILE_SUFFIX))
        .unwrap_or(false)
}

/// Unquoted YAML scalars (`password: 90817263`) are taken as text
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(_) => Err(de::Error::custom("expected a scalar value")),
    }
}

/// Deserialize the raw options; the password never appears in the error
fn raw_options(value: Value) -> Result<RawInventoryOptions> {
    let scrubber = match value.get("password") {
        Some(Value::String(text)) => SecretScrubber::new().with_secret(text.as_str()),
        Some(Value::Number(number)) => SecretScrubber::new().with_secret(number.to_string()),
        _ => SecretScrubber::new(),
    };
    serde_json::from_value(value).map_err(|e| {
        CredentialError::SchemaError(format!(
            "Invalid inventory options: {}",
            scrubber.scrub(&e.to_string())
        ))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn credential_option<E: EnvLookup>(
    file_value: Option<String>,
    env: &E,
    option: &'static str,
    variable: &'static str,
) -> std::result::Result<String, InventoryError> {
    if let Some(value) = non_empty(file_value) {
        debug!(option, "inventory option taken from file");
        return Ok(value);
    }
    match non_empty(env.lookup(variable)) {
        Some(value) => {
            debug!(option, variable, "inventory option taken from environment");
            Ok(value)
        }
        None => Err(InventoryError::MissingCredential { option, variable }),
    }
}

impl InventoryOptions {
    /// Resolve raw file options against an environment
    pub fn resolve<E: EnvLookup>(
        raw: RawInventoryOptions,
        env: &E,
    ) -> std::result::Result<Self, InventoryError> {
        match raw.plugin.as_deref() {
            Some(PLUGIN_NAME) => {}
            Some(other) => return Err(InventoryError::WrongPlugin(other.to_string())),
            None => return Err(InventoryError::MissingOption("plugin")),
        }
        if raw.compose.is_some() {
            return Err(InventoryError::UnsupportedOption("compose"));
        }
        if raw.groups.is_some() {
            return Err(InventoryError::UnsupportedOption("groups"));
        }

        let host = credential_option(raw.host, env, "host", DNAC_HOST)?;
        let username = credential_option(raw.username, env, "username", DNAC_USERNAME)?;
        let password = credential_option(raw.password, env, "password", DNAC_PASSWORD)?;
        let dnac_version =
            non_empty(raw.dnac_version).ok_or(InventoryError::MissingOption("dnac_version"))?;

        let api_record_limit = raw.api_record_limit.unwrap_or(DEFAULT_RECORD_LIMIT);
        if api_record_limit == 0 {
            return Err(InventoryError::InvalidRecordLimit);
        }

        let device_family = raw
            .device_family
            .unwrap_or_else(|| DEFAULT_DEVICE_FAMILIES.iter().map(|f| f.to_string()).collect());

        Ok(Self {
            host,
            dnac_version,
            username,
            password: SecretString::new(password),
            validate_certs: raw.validate_certs.unwrap_or(true),
            use_dnac_mgmt_int: raw.use_dnac_mgmt_int.unwrap_or(true),
            toplevel: non_empty(raw.toplevel),
            api_record_limit,
            hostname_filter: non_empty(raw.hostname_filter),
            device_family,
            location_name: non_empty(raw.location_name),
            keyed_groups: raw.keyed_groups.unwrap_or_default(),
            strict: raw.strict.unwrap_or(false),
        })
    }

    /// Parse YAML content and resolve it
    pub fn from_yaml<E: EnvLookup>(content: &str, env: &E) -> Result<Self> {
        let raw = raw_options(loader::DocumentFormat::Yaml.parse(content)?)?;
        Ok(Self::resolve(raw, env)?)
    }

    /// Load and resolve an inventory source file
    pub fn load<E: EnvLookup>(path: &Path, env: &E) -> Result<Self> {
        if !verify_file(path) {
            return Err(InventoryError::UnsupportedFile(path.display().to_string()).into());
        }
        let raw = raw_options(loader::read_value(path)?)?;
        Ok(Self::resolve(raw, env)?)
    }

    /// Controller API base URL
    pub fn base_url(&self) -> String {
        format!("https://{}", self.host)
    }

    /// Device list calls needed to fetch `device_count` devices
    pub fn device_queries(&self, device_count: u64) -> Vec<DeviceListQuery> {
        page_plan(device_count, self.api_record_limit)
            .into_iter()
            .map(|page| DeviceListQuery {
                page,
                hostname: self.hostname_filter.clone(),
                family: self.device_family.clone(),
                location_name: self.location_name.clone(),
            })
            .collect()
    }

    pub fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }

    pub fn summary(&self) -> InventoryOptionsSummary {
        InventoryOptionsSummary {
            host: self.host.clone(),
            dnac_version: self.dnac_version.clone(),
            username: self.username.clone(),
            password: REDACTED.to_string(),
            validate_certs: self.validate_certs,
            use_dnac_mgmt_int: self.use_dnac_mgmt_int,
            toplevel: self.toplevel.clone(),
            api_record_limit: self.api_record_limit,
            hostname_filter: self.hostname_filter.clone(),
            device_family: self.device_family.clone(),
            location_name: self.location_name.clone(),
            keyed_groups: self.keyed_groups.clone(),
            strict: self.strict,
            base_url: self.base_url(),
        }
    }
}
