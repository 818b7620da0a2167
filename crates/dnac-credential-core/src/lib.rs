//! DNA Center Credential Toolkit
//!
//! Models, validates and renders the custom credential type that feeds the
//! `dna_center` dynamic inventory source inside an AWX / Tower style
//! automation platform.
//!
//! ## Features
//!
//! - **Credential model**: the input schema (`fields` + `required`) and the
//!   injector mapping (`env`) as typed, order-independent documents
//! - **Validation**: rule-based checks with stable finding codes
//! - **Rendering**: a fail-closed reference renderer for the injector contract
//! - **Secret hygiene**: secret values are wrapped in [`secrecy`] types and
//!   scrubbed from any message before it is logged
//! - **Inventory source**: resolves `dna_center.yml` options against the
//!   injected environment and builds inventory groups and host variables from
//!   controller snapshots
//!
//! ## Architecture
//!
//! 1. **Model** (`model/`): credential definition, injector mapping and the
//!    full credential type document, including the two built-in variants.
//! 2. **Template** (`template`): the `{{ field }}` subset injectors may use.
//! 3. **Loader** (`loader`): JSON / YAML / TOML document loading.
//! 4. **Validation** (`validation/`): validator and credential rules.
//! 5. **Render** (`render`): credential inputs to process environment.
//! 6. **Redact** (`redact`): message scrubbing for known secrets.
//! 7. **Inventory** (`inventory/`): the consumer of the injected variables.
//!
//! ## Example
//!
//! ```rust
//! use dnac_credential_core::{
//!     CredentialInputs, CredentialType, InjectorRenderer, Validator, ValidationContext, Variant,
//! };
//!
//! let credential_type = CredentialType::builtin(Variant::Standard);
//! let validator = Validator::new(ValidationContext::new());
//! let result = validator.validate(&credential_type.inputs, Some(&credential_type.injectors));
//! assert!(result.valid);
//!
//! let mut inputs = CredentialInputs::new();
//! inputs.insert("host", "10.0.0.5", false);
//! inputs.insert("username", "admin", false);
//! inputs.insert("password", "s3cr3t", true);
//!
//! let env = InjectorRenderer::new(&credential_type.inputs, &credential_type.injectors)
//!     .render(&inputs)
//!     .unwrap();
//! assert_eq!(env.expose("DNAC_HOST"), Some("10.0.0.5"));
//! ```

pub mod config;
pub mod error;
pub mod inventory;
pub mod loader;
pub mod model;
pub mod redact;
pub mod render;
pub mod template;
pub mod validation;

pub use config::{LogFormat, ToolConfig, ToolConfigBuilder};
pub use error::{CredentialError, Result};
pub use inventory::{
    EnvLookup, Inventory, InventoryBuilder, InventoryError, InventoryOptions, ProcessEnv,
};
pub use loader::DocumentFormat;
pub use model::{
    CanonicalDefinition, CredentialDefinition, CredentialKind, CredentialType, FieldDescriptor,
    FieldType, InjectorMapping, Variant, CONTRACT_BINDINGS, CONTRACT_FIELDS, DNAC_HOST,
    DNAC_PASSWORD, DNAC_USERNAME, HOST_FIELD, PASSWORD_FIELD, USERNAME_FIELD,
};
pub use redact::{SecretScrubber, REDACTED};
pub use render::{
    CredentialInputs, CredentialValue, InjectorRenderer, RenderError, RenderedEnvironment,
};
pub use template::{Segment, Template, TemplateError};
pub use validation::{
    ValidationContext, ValidationFinding, ValidationResult, ValidationSeverity, Validator,
};

/// Crate version (from Cargo.toml)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
