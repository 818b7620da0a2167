//! Credential input definition (`fields` + `required`)

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

use super::field::FieldDescriptor;
use crate::error::{CredentialError, Result};

/// The input configuration of a credential type
///
/// Declaration order is preserved for display but carries no meaning: two
/// definitions listing the same descriptors in a different order are
/// equivalent (see [`CredentialDefinition::is_equivalent`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialDefinition {
    /// Field descriptors in declaration order
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Ids of the fields that must be filled in
    #[serde(default)]
    pub required: Vec<String>,
}

/// Order-free form of a [`CredentialDefinition`]
///
/// Every declaration is kept, so a duplicated id changes the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalDefinition {
    /// Descriptors grouped by id, each group sorted
    pub fields: BTreeMap<String, Vec<FieldDescriptor>>,
    /// Required ids, sorted, repeats included
    pub required: Vec<String>,
}

impl CredentialDefinition {
    /// Create a definition from fields and required ids
    pub fn new<I, S>(fields: Vec<FieldDescriptor>, required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields,
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// First descriptor declared with `id`
    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Field ids in declaration order (duplicates included)
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.id.as_str())
    }

    /// Distinct declared ids
    pub fn id_set(&self) -> BTreeSet<&str> {
        self.ids().collect()
    }

    /// Distinct required ids
    pub fn required_set(&self) -> BTreeSet<&str> {
        self.required.iter().map(String::as_str).collect()
    }

    /// Number of descriptors declaring `id`
    pub fn occurrences(&self, id: &str) -> usize {
        self.fields.iter().filter(|f| f.id == id).count()
    }

    pub fn is_declared(&self, id: &str) -> bool {
        self.field(id).is_some()
    }

    pub fn is_required(&self, id: &str) -> bool {
        self.required.iter().any(|r| r == id)
    }

    /// Whether any descriptor for `id` is marked secret
    pub fn is_secret(&self, id: &str) -> bool {
        self.fields.iter().any(|f| f.id == id && f.secret)
    }

    /// Order-free form of this definition
    pub fn canonical(&self) -> CanonicalDefinition {
        let mut fields: BTreeMap<String, Vec<FieldDescriptor>> = BTreeMap::new();
        for field in &self.fields {
            fields.entry(field.id.clone()).or_default().push(field.clone());
        }
        for declarations in fields.values_mut() {
            declarations.sort();
        }
        let mut required = self.required.clone();
        required.sort();
        CanonicalDefinition { fields, required }
    }

    /// Semantic equality, ignoring declaration order
    pub fn is_equivalent(&self, other: &CredentialDefinition) -> bool {
        self.canonical() == other.canonical()
    }

    /// SHA-256 hex digest of the canonical form
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(&self.canonical())
            .map_err(|e| CredentialError::SerializationError(e.to_string()))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}
