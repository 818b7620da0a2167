//! Tool configuration
//!
//! Defaults can be overridden through environment variables; the CLI layers
//! its flags on top.

use std::fmt;
use std::str::FromStr;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Toolkit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Treat validation warnings as errors
    pub strict: bool,

    /// Accept credential fields beyond host/username/password without a warning
    pub allow_extra_fields: bool,

    /// Log output format
    pub log_format: LogFormat,

    /// Name used when exporting credential types
    pub credential_type_name: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            strict: false,
            allow_extra_fields: false,
            log_format: LogFormat::Text,
            credential_type_name: "DNA Center".to_string(),
        }
    }
}

impl ToolConfig {
    /// Create a new config builder
    pub fn builder() -> ToolConfigBuilder {
        ToolConfigBuilder::new()
    }

    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Create config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            strict: lookup("DNAC_CREDENTIAL_STRICT")
                .map(|v| v.parse().unwrap_or(defaults.strict))
                .unwrap_or(defaults.strict),
            allow_extra_fields: lookup("DNAC_CREDENTIAL_ALLOW_EXTRA_FIELDS")
                .map(|v| v.parse().unwrap_or(defaults.allow_extra_fields))
                .unwrap_or(defaults.allow_extra_fields),
            log_format: lookup("DNAC_CREDENTIAL_LOG_FORMAT")
                .map(|v| v.parse().unwrap_or(defaults.log_format))
                .unwrap_or(defaults.log_format),
            credential_type_name: lookup("DNAC_CREDENTIAL_TYPE_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.credential_type_name),
        }
    }
}

/// Builder for ToolConfig
pub struct ToolConfigBuilder {
    config: ToolConfig,
}

impl ToolConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        Self {
            config: ToolConfig::default(),
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    pub fn allow_extra_fields(mut self, allow: bool) -> Self {
        self.config.allow_extra_fields = allow;
        self
    }

    pub fn log_format(mut self, format: LogFormat) -> Self {
        self.config.log_format = format;
        self
    }

    pub fn credential_type_name(mut self, name: impl Into<String>) -> Self {
        self.config.credential_type_name = name.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> ToolConfig {
        self.config
    }
}

impl Default for ToolConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
