//! Built-in credential rules
//!
//! | code | severity | meaning |
//! |------|----------|---------|
//! | CRED001 | error | field id declared more than once |
//! | CRED002 | error | host/username/password not declared |
//! | CRED003 | error | required id not declared in `fields` |
//! | CRED004 | error | host/username/password not required |
//! | CRED005 | error | password not marked secret |
//! | CRED006 | error | field beyond host/username/password |
//! | CRED007 | warning | empty label |
//! | CRED008 | warning | secret-looking field not marked secret |
//! | CRED009 | warning | id listed more than once in `required` |
//! | CRED010 | error | field id is not a valid identifier |
//! | CRED011 | error | host/username/password is not a string input |
//! | INJ001 | error | template references an undeclared field |
//! | INJ002 | error | DNAC_* variable missing |
//! | INJ003 | error | DNAC_* variable bound to the wrong field |
//! | INJ004 | error | variable beyond the DNAC_* set |
//! | INJ005 | error | invalid environment variable name |
//! | INJ006 | error | unsupported template syntax |
//! | INJ007 | warning | secret field injected into a non-secret-looking variable |

use std::collections::HashSet;

use super::{ValidationContext, ValidationFinding, ValidationResult, ValidationRule, ValidationTarget};
use crate::model::{
    contract_field_for, FieldType, CONTRACT_BINDINGS, CONTRACT_FIELDS, PASSWORD_FIELD,
};
use crate::template::{is_identifier, Template};

const SECRET_MARKERS: [&str; 5] = ["password", "passwd", "secret", "token", "key"];

/// Whether a name looks like it carries a secret
pub fn looks_secret(name: &str) -> bool {
    let lower = name.to_lowercase();
    SECRET_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Field ids: uniqueness, presence of the contract fields, extras, labels
pub struct FieldIdentityRule;

impl ValidationRule for FieldIdentityRule {
    fn validate(
        &self,
        target: &ValidationTarget<'_>,
        context: &ValidationContext,
        result: &mut ValidationResult,
    ) {
        let definition = target.definition;
        let mut seen = HashSet::new();

        for (index, field) in definition.fields.iter().enumerate() {
            let path = format!("$.fields[{}]", index);

            if !is_identifier(&field.id) {
                result.add_finding(
                    ValidationFinding::error(
                        "CRED010",
                        format!("Field id '{}' is not a valid identifier", field.id),
                        format!("{}.id", path),
                    )
                    .with_suggestion("Use letters, digits and underscores, not starting with a digit"),
                );
            }

            if !seen.insert(field.id.as_str()) {
                result.add_finding(
                    ValidationFinding::error(
                        "CRED001",
                        format!("Field id '{}' is declared more than once", field.id),
                        format!("{}.id", path),
                    )
                    .with_suggestion(format!("Remove the duplicate '{}' entry", field.id)),
                );
            }

            if field.label.trim().is_empty() {
                result.add_finding(ValidationFinding::warning(
                    "CRED007",
                    format!("Field '{}' has an empty label", field.id),
                    format!("{}.label", path),
                ));
            }

            let is_contract = CONTRACT_FIELDS.contains(&field.id.as_str());
            if is_contract && field.field_type != FieldType::String {
                result.add_finding(
                    ValidationFinding::error(
                        "CRED011",
                        format!(
                            "Field '{}' must be a string input, found '{}'",
                            field.id, field.field_type
                        ),
                        format!("{}.type", path),
                    )
                    .with_suggestion("Set 'type: string'"),
                );
            }

            if !is_contract && !context.allow_extra_fields {
                result.add_finding(
                    ValidationFinding::error(
                        "CRED006",
                        format!(
                            "Field '{}' is not part of the DNA Center credential contract",
                            field.id
                        ),
                        path,
                    )
                    .with_suggestion(
                        "Remove the field, or pass --allow-extra-fields if it is intentional",
                    ),
                );
            }
        }

        for id in CONTRACT_FIELDS {
            if !definition.is_declared(id) {
                result.add_finding(
                    ValidationFinding::error(
                        "CRED002",
                        format!("Required credential field '{}' is not declared", id),
                        "$.fields",
                    )
                    .with_suggestion(format!("Add a field with 'id: {}'", id)),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "field_identity"
    }
}

/// The `required` list: subset of declared ids and covering the contract
pub struct RequiredListRule;

impl ValidationRule for RequiredListRule {
    fn validate(
        &self,
        target: &ValidationTarget<'_>,
        _context: &ValidationContext,
        result: &mut ValidationResult,
    ) {
        let definition = target.definition;
        let mut seen = HashSet::new();

        for (index, id) in definition.required.iter().enumerate() {
            let path = format!("$.required[{}]", index);
            if !definition.is_declared(id) {
                result.add_finding(
                    ValidationFinding::error(
                        "CRED003",
                        format!("Required id '{}' does not match any declared field", id),
                        path.clone(),
                    )
                    .with_suggestion(format!("Declare '{}' under fields or remove it", id)),
                );
            }
            if !seen.insert(id.as_str()) {
                result.add_finding(ValidationFinding::warning(
                    "CRED009",
                    format!("'{}' is listed more than once in required", id),
                    path,
                ));
            }
        }

        for id in CONTRACT_FIELDS {
            if !definition.is_required(id) {
                result.add_finding(
                    ValidationFinding::error(
                        "CRED004",
                        format!("Field '{}' must be listed in required", id),
                        "$.required",
                    )
                    .with_suggestion(format!("Add '{}' to the required list", id)),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "required_list"
    }
}

/// Secret marking of the password and secret-looking fields
pub struct SecretFieldRule;

impl ValidationRule for SecretFieldRule {
    fn validate(
        &self,
        target: &ValidationTarget<'_>,
        _context: &ValidationContext,
        result: &mut ValidationResult,
    ) {
        for (index, field) in target.definition.fields.iter().enumerate() {
            if field.secret {
                continue;
            }
            let path = format!("$.fields[{}].secret", index);
            if field.id == PASSWORD_FIELD {
                result.add_finding(
                    ValidationFinding::error(
                        "CRED005",
                        "Field 'password' must be marked secret",
                        path,
                    )
                    .with_suggestion("Add 'secret: true' to the password field"),
                );
            } else if looks_secret(&field.id) {
                result.add_finding(
                    ValidationFinding::warning(
                        "CRED008",
                        format!("Field '{}' looks like a secret but is not marked secret", field.id),
                        path,
                    )
                    .with_suggestion("Add 'secret: true' so the value is encrypted and masked"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "secret_fields"
    }
}

/// Injector mapping: syntax, references and the fixed DNAC_* bindings
pub struct InjectorRule;

impl ValidationRule for InjectorRule {
    fn validate(
        &self,
        target: &ValidationTarget<'_>,
        context: &ValidationContext,
        result: &mut ValidationResult,
    ) {
        let Some(injectors) = target.injectors else {
            return;
        };
        let definition = target.definition;

        for (variable, source) in &injectors.env {
            let path = format!("$.env.{}", variable);

            if !is_identifier(variable) {
                result.add_finding(
                    ValidationFinding::error(
                        "INJ005",
                        format!("'{}' is not a valid environment variable name", variable),
                        path.clone(),
                    )
                    .with_suggestion("Use letters, digits and underscores, not starting with a digit"),
                );
            }

            let template = match Template::parse(source) {
                Ok(template) => template,
                Err(e) => {
                    result.add_finding(
                        ValidationFinding::error(
                            "INJ006",
                            format!("Template for '{}' is not supported: {}", variable, e),
                            path,
                        )
                        .with_suggestion("Use a plain '{{ field_id }}' reference"),
                    );
                    continue;
                }
            };

            for reference in template.references() {
                if !definition.is_declared(reference) {
                    result.add_finding(
                        ValidationFinding::error(
                            "INJ001",
                            format!(
                                "'{}' references undeclared field '{}'",
                                variable, reference
                            ),
                            path.clone(),
                        )
                        .with_suggestion(format!(
                            "Declare '{}' under fields or fix the reference",
                            reference
                        )),
                    );
                } else if definition.is_secret(reference) && !looks_secret(variable) {
                    result.add_finding(ValidationFinding::warning(
                        "INJ007",
                        format!(
                            "Secret field '{}' is injected into '{}', which does not look like a secret variable",
                            reference, variable
                        ),
                        path.clone(),
                    ));
                }
            }

            match contract_field_for(variable) {
                Some(expected) => {
                    if template.single_reference() != Some(expected) {
                        result.add_finding(
                            ValidationFinding::error(
                                "INJ003",
                                format!(
                                    "'{}' must be templated as '{{{{ {} }}}}', found '{}'",
                                    variable, expected, source
                                ),
                                path,
                            )
                            .with_suggestion(format!("Set {}: '{{{{ {} }}}}'", variable, expected)),
                        );
                    }
                }
                None if context.allow_extra_fields => {}
                None => {
                    result.add_finding(
                        ValidationFinding::error(
                            "INJ004",
                            format!("'{}' is not read by the DNA Center inventory source", variable),
                            path,
                        )
                        .with_suggestion("The injector sets exactly DNAC_HOST, DNAC_USERNAME and DNAC_PASSWORD"),
                    );
                }
            }
        }

        for (variable, field) in CONTRACT_BINDINGS {
            if !injectors.env.contains_key(variable) {
                result.add_finding(
                    ValidationFinding::error(
                        "INJ002",
                        format!("Injector does not set '{}'", variable),
                        "$.env",
                    )
                    .with_suggestion(format!("Add {}: '{{{{ {} }}}}'", variable, field)),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "injector_mapping"
    }
}
