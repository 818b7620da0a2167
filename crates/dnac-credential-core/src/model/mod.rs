//! Credential type data model
//!
//! The model mirrors the two documents an operator pastes into the
//! automation platform when creating the custom credential type:
//!
//! - the **input configuration** (`fields` and `required`)
//! - the **injector configuration** (`env`)
//!
//! plus the full credential type document wrapping both.

pub mod credential_type;
pub mod definition;
pub mod field;
pub mod injector;

pub use credential_type::{CredentialKind, CredentialType, Variant};
pub use definition::{CanonicalDefinition, CredentialDefinition};
pub use field::{FieldDescriptor, FieldType};
pub use injector::InjectorMapping;

/// Field id holding the controller address
pub const HOST_FIELD: &str = "host";
/// Field id holding the API user
pub const USERNAME_FIELD: &str = "username";
/// Field id holding the API password
pub const PASSWORD_FIELD: &str = "password";

/// Environment variable carrying the controller address
pub const DNAC_HOST: &str = "DNAC_HOST";
/// Environment variable carrying the API user
pub const DNAC_USERNAME: &str = "DNAC_USERNAME";
/// Environment variable carrying the API password
pub const DNAC_PASSWORD: &str = "DNAC_PASSWORD";

/// Field ids every DNA Center credential must declare
pub const CONTRACT_FIELDS: [&str; 3] = [HOST_FIELD, USERNAME_FIELD, PASSWORD_FIELD];

/// Fixed injector bindings: environment variable to the field it renders
pub const CONTRACT_BINDINGS: [(&str, &str); 3] = [
    (DNAC_HOST, HOST_FIELD),
    (DNAC_USERNAME, USERNAME_FIELD),
    (DNAC_PASSWORD, PASSWORD_FIELD),
];

/// Look up the contract field a fixed environment variable must render
pub fn contract_field_for(variable: &str) -> Option<&'static str> {
    CONTRACT_BINDINGS
        .iter()
        .find(|(var, _)| *var == variable)
        .map(|(_, field)| *field)
}
