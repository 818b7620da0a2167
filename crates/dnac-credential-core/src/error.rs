//! Error types for the DNA Center credential toolkit
//!
//! Provides structured error types for document loading, validation,
//! injector rendering and inventory option resolution.

use thiserror::Error;

use crate::inventory::InventoryError;
use crate::render::RenderError;

/// Main error type for credential operations
#[derive(Error, Debug)]
pub enum CredentialError {
    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File access or I/O error
    #[error("File error: {0}")]
    FileError(String),

    /// Document parsing error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Credential schema error (document shape is wrong)
    #[error("Schema error: {0}")]
    SchemaError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A credential definition was rejected by validation
    #[error("Validation failed: {0}")]
    RuleViolation(String),

    /// Injector rendering failed closed
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Inventory source configuration error
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl CredentialError {
    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        CredentialError::InvalidInput(msg.into())
    }

    /// Create a file error
    pub fn file_error(msg: impl Into<String>) -> Self {
        CredentialError::FileError(msg.into())
    }

    /// Create a parse error
    pub fn parse_error(msg: impl Into<String>) -> Self {
        CredentialError::ParseError(msg.into())
    }

    /// Create a schema error
    pub fn schema_error(msg: impl Into<String>) -> Self {
        CredentialError::SchemaError(msg.into())
    }

    /// Check if this is a user-facing error (vs internal)
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            CredentialError::InternalError(_) | CredentialError::SerializationError(_)
        )
    }
}

impl From<std::io::Error> for CredentialError {
    fn from(err: std::io::Error) -> Self {
        CredentialError::FileError(err.to_string())
    }
}

impl From<serde_json::Error> for CredentialError {
    fn from(err: serde_json::Error) -> Self {
        CredentialError::ParseError(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for CredentialError {
    fn from(err: serde_yaml::Error) -> Self {
        CredentialError::ParseError(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for CredentialError {
    fn from(err: toml::de::Error) -> Self {
        CredentialError::ParseError(format!("TOML error: {}", err))
    }
}

/// Result type alias for credential operations
pub type Result<T> = std::result::Result<T, CredentialError>;
