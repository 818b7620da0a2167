//! Credential definition validation
//!
//! Runs a fixed set of rules over a [`CredentialDefinition`] and, when
//! supplied, its [`InjectorMapping`]. Each rule appends findings with a
//! stable code (`CRED*` for inputs, `INJ*` for injectors). Validation never
//! modifies the documents and is deterministic.

pub mod rules;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::ToolConfig;
use crate::error::{CredentialError, Result};
use crate::model::{CredentialDefinition, InjectorMapping};

/// Severity levels for validation findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    /// Configuration error, the credential type must be rejected
    Error,
    /// Should be addressed; escalated to an error in strict mode
    Warning,
    /// Informational finding
    Info,
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationSeverity::Error => write!(f, "error"),
            ValidationSeverity::Warning => write!(f, "warning"),
            ValidationSeverity::Info => write!(f, "info"),
        }
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: ValidationSeverity,
    /// Stable finding code, e.g. `CRED005`
    pub code: String,
    pub message: String,
    /// Path to the offending entry, e.g. `$.fields[2].secret`
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationFinding {
    pub fn error(code: impl Into<String>, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Error, code, message, path)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Warning, code, message, path)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ValidationSeverity::Info, code, message, path)
    }

    fn new(
        severity: ValidationSeverity,
        code: impl Into<String>,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            path: path.into(),
            suggestion: None,
        }
    }

    /// Add a suggested fix
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == ValidationSeverity::Error
    }
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} at '{}': {}", self.severity, self.code, self.path, self.message)
    }
}

/// Result of a validation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether the definition is acceptable (no errors)
    pub valid: bool,
    pub findings: Vec<ValidationFinding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            valid: true,
            findings: Vec::new(),
            duration_ms: None,
        }
    }

    pub fn with_findings(findings: Vec<ValidationFinding>) -> Self {
        let valid = !findings.iter().any(ValidationFinding::is_blocking);
        Self {
            valid,
            findings,
            duration_ms: None,
        }
    }

    pub fn add_finding(&mut self, finding: ValidationFinding) {
        if finding.is_blocking() {
            self.valid = false;
        }
        self.findings.push(finding);
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn errors(&self) -> Vec<&ValidationFinding> {
        self.by_severity(ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> Vec<&ValidationFinding> {
        self.by_severity(ValidationSeverity::Warning)
    }

    fn by_severity(&self, severity: ValidationSeverity) -> Vec<&ValidationFinding> {
        self.findings.iter().filter(|f| f.severity == severity).collect()
    }

    pub fn has_warnings(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == ValidationSeverity::Warning)
    }

    /// Whether any finding carries `code`
    pub fn has_code(&self, code: &str) -> bool {
        self.findings.iter().any(|f| f.code == code)
    }

    /// Turn every warning into an error
    pub fn escalate_warnings(&mut self) {
        for finding in &mut self.findings {
            if finding.severity == ValidationSeverity::Warning {
                finding.severity = ValidationSeverity::Error;
                self.valid = false;
            }
        }
    }
}

/// Context for validation operations
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Treat warnings as errors
    pub strict_mode: bool,
    /// Do not warn about fields beyond host/username/password
    pub allow_extra_fields: bool,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ToolConfig) -> Self {
        Self {
            strict_mode: config.strict,
            allow_extra_fields: config.allow_extra_fields,
        }
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn with_extra_fields_allowed(mut self, allow: bool) -> Self {
        self.allow_extra_fields = allow;
        self
    }
}

/// What a rule looks at
#[derive(Debug, Clone, Copy)]
pub struct ValidationTarget<'a> {
    pub definition: &'a CredentialDefinition,
    pub injectors: Option<&'a InjectorMapping>,
}

/// Trait for validation rules
pub trait ValidationRule: Send + Sync {
    /// Apply this rule, appending findings to `result`
    fn validate(
        &self,
        target: &ValidationTarget<'_>,
        context: &ValidationContext,
        result: &mut ValidationResult,
    );

    /// Get the rule name
    fn name(&self) -> &'static str;
}

/// Credential type validator
pub struct Validator {
    context: ValidationContext,
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a validator with the built-in rules
    pub fn new(context: ValidationContext) -> Self {
        let mut validator = Self {
            context,
            rules: Vec::new(),
        };
        validator.add_builtin_rules();
        validator
    }

    fn add_builtin_rules(&mut self) {
        self.rules.push(Box::new(rules::FieldIdentityRule));
        self.rules.push(Box::new(rules::RequiredListRule));
        self.rules.push(Box::new(rules::SecretFieldRule));
        self.rules.push(Box::new(rules::InjectorRule));
    }

    /// Register an additional rule
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    /// Validate a definition and, if given, its injector mapping
    pub fn validate(
        &self,
        definition: &CredentialDefinition,
        injectors: Option<&InjectorMapping>,
    ) -> ValidationResult {
        let start = Instant::now();
        let target = ValidationTarget {
            definition,
            injectors,
        };

        let mut result = ValidationResult::valid();
        for rule in &self.rules {
            let before = result.findings.len();
            rule.validate(&target, &self.context, &mut result);
            debug!(
                rule = rule.name(),
                findings = result.findings.len() - before,
                "rule evaluated"
            );
        }

        if self.context.strict_mode {
            result.escalate_warnings();
        }

        let result = result.with_duration(start.elapsed().as_millis() as u64);
        if result.valid {
            info!(
                warnings = result.warnings().len(),
                "credential definition accepted"
            );
        } else {
            warn!(
                errors = result.errors().len(),
                warnings = result.warnings().len(),
                "credential definition rejected"
            );
        }
        result
    }

    /// Validate and turn a rejection into an error
    pub fn ensure_valid(
        &self,
        definition: &CredentialDefinition,
        injectors: Option<&InjectorMapping>,
    ) -> Result<ValidationResult> {
        let result = self.validate(definition, injectors);
        if result.valid {
            Ok(result)
        } else {
            let summary = result
                .errors()
                .iter()
                .map(|f| format!("{} {}", f.code, f.message))
                .collect::<Vec<_>>()
                .join("; ");
            Err(CredentialError::RuleViolation(summary))
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationContext::default())
    }
}
