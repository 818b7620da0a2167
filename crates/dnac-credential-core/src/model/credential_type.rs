//! Full credential type document and the built-in variants

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{
    CredentialDefinition, FieldDescriptor, InjectorMapping, HOST_FIELD, PASSWORD_FIELD,
    USERNAME_FIELD,
};

/// Credential kinds a custom credential type may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKind {
    #[default]
    Cloud,
    Net,
}

/// A custom credential type as registered with the automation platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialType {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: CredentialKind,
    pub inputs: CredentialDefinition,
    pub injectors: InjectorMapping,
}

/// The two documented field orders
///
/// Both describe the same credential; they differ only in the order in which
/// `fields` and `required` are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// `host`, `username`, `password`
    #[default]
    Standard,
    /// `username`, `password`, `host`
    Legacy,
}

impl Variant {
    pub const ALL: [Variant; 2] = [Variant::Standard, Variant::Legacy];

    /// Field ids in declaration order for this variant
    pub fn field_order(&self) -> [&'static str; 3] {
        match self {
            Variant::Standard => [HOST_FIELD, USERNAME_FIELD, PASSWORD_FIELD],
            Variant::Legacy => [USERNAME_FIELD, PASSWORD_FIELD, HOST_FIELD],
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Standard => write!(f, "standard"),
            Variant::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" | "host-first" => Ok(Variant::Standard),
            "legacy" | "username-first" => Ok(Variant::Legacy),
            _ => Err(format!("Unknown credential variant: {}", s)),
        }
    }
}

fn descriptor_for(id: &str) -> FieldDescriptor {
    match id {
        HOST_FIELD => FieldDescriptor::string(HOST_FIELD, "DNA Center Host")
            .with_help_text("FQDN or IP address of the DNA Center controller"),
        USERNAME_FIELD => FieldDescriptor::string(USERNAME_FIELD, "Username"),
        _ => FieldDescriptor::secret(PASSWORD_FIELD, "Password"),
    }
}

impl CredentialType {
    pub const DEFAULT_NAME: &'static str = "DNA Center";

    /// Build one of the documented credential types
    pub fn builtin(variant: Variant) -> Self {
        let order = variant.field_order();
        Self {
            name: Self::DEFAULT_NAME.to_string(),
            description: "Host and API credentials for the dna_center inventory source"
                .to_string(),
            kind: CredentialKind::Cloud,
            inputs: CredentialDefinition::new(
                order.iter().map(|id| descriptor_for(id)).collect(),
                order,
            ),
            injectors: InjectorMapping::contract(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parsing() {
        assert_eq!("standard".parse::<Variant>().unwrap(), Variant::Standard);
        assert_eq!("LEGACY".parse::<Variant>().unwrap(), Variant::Legacy);
        assert_eq!("username-first".parse::<Variant>().unwrap(), Variant::Legacy);
        assert!("other".parse::<Variant>().is_err());
    }

    #[test]
    fn test_builtin_order() {
        let standard = CredentialType::builtin(Variant::Standard);
        let ids: Vec<_> = standard.inputs.ids().collect();
        assert_eq!(ids, vec!["host", "username", "password"]);

        let legacy = CredentialType::builtin(Variant::Legacy);
        let ids: Vec<_> = legacy.inputs.ids().collect();
        assert_eq!(ids, vec!["username", "password", "host"]);
        assert_eq!(legacy.inputs.required, vec!["username", "password", "host"]);
    }

    #[test]
    fn test_builtins_are_equivalent() {
        let standard = CredentialType::builtin(Variant::Standard);
        let legacy = CredentialType::builtin(Variant::Legacy);
        assert!(standard.inputs.is_equivalent(&legacy.inputs));
        assert_eq!(standard.injectors, legacy.injectors);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let yaml = serde_yaml::to_string(&CredentialType::builtin(Variant::Standard)).unwrap();
        assert!(yaml.contains("kind: cloud"));
        assert!(yaml.contains("DNAC_PASSWORD"));
    }
}
