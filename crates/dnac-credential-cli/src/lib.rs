//! `dnac-credential` command-line interface
//!
//! Validates, renders, compares and exports the DNA Center custom credential
//! type, and exercises the `dna_center` inventory source against the
//! resulting environment.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Validation failed with errors
//! - 2: Validation passed with warnings
//! - 3: Invalid input or arguments
//! - 4: File not found or inaccessible
//! - 5: Document does not match the expected schema
//! - 10: Internal error

pub mod commands;
pub mod logging;
pub mod output;

pub use commands::{Commands, DnacCli, InventoryCommands};
pub use output::OutputFormat;

use dnac_credential_core::{CredentialError, SecretScrubber, ToolConfig};

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful execution
    Success = 0,
    /// Validation failed with errors
    ValidationError = 1,
    /// Validation passed with warnings
    ValidationWarning = 2,
    /// Invalid input or arguments
    InvalidInput = 3,
    /// File not found or inaccessible
    FileError = 4,
    /// Schema-related errors
    SchemaError = 5,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Determine exit code from validation result
    pub fn from_validation_result(has_errors: bool, has_warnings: bool) -> Self {
        if has_errors {
            ExitCode::ValidationError
        } else if has_warnings {
            ExitCode::ValidationWarning
        } else {
            ExitCode::Success
        }
    }

    /// Exit code for a command that failed with `error`
    pub fn from_error(error: &CredentialError) -> Self {
        match error {
            CredentialError::FileError(_) => ExitCode::FileError,
            CredentialError::SchemaError(_) => ExitCode::SchemaError,
            CredentialError::RuleViolation(_) => ExitCode::ValidationError,
            e if e.is_user_error() => ExitCode::InvalidInput,
            _ => ExitCode::InternalError,
        }
    }
}

/// Run a parsed command line against the given tool configuration
pub fn run(cli: DnacCli, config: &ToolConfig) -> Result<ExitCode, CredentialError> {
    match cli.command {
        Commands::Validate {
            inputs,
            injectors,
            format,
            strict,
            allow_extra_fields,
        } => commands::execute_validate(
            &inputs,
            injectors.as_deref(),
            format.unwrap_or_default(),
            strict || config.strict,
            allow_extra_fields || config.allow_extra_fields,
        ),
        Commands::Render {
            inputs,
            injectors,
            values,
            format,
            reveal,
        } => commands::execute_render(&inputs, injectors.as_deref(), &values, format, reveal, config),
        Commands::Compare { inputs, format } => {
            commands::execute_compare(&inputs, format.unwrap_or_default())
        }
        Commands::Export {
            variant,
            name,
            format,
        } => {
            let name = name.unwrap_or_else(|| config.credential_type_name.clone());
            commands::execute_export(variant, &name, format)
        }
        Commands::Inventory { command } => match command {
            InventoryCommands::Options {
                config: path,
                device_count,
                format,
            } => commands::execute_inventory_options(&path, device_count, format.unwrap_or_default()),
            InventoryCommands::Build {
                config: path,
                devices,
                sites,
                topology,
                format,
            } => commands::execute_inventory_build(
                &path,
                &devices,
                &sites,
                &topology,
                format.unwrap_or(OutputFormat::Json),
            ),
        },
    }
}

/// Run the CLI and map failures to an exit code
///
/// Error messages are scrubbed of anything that looks like a secret
/// assignment before they are printed.
pub fn run_cli(cli: DnacCli, config: &ToolConfig) -> ExitCode {
    match run(cli, config) {
        Ok(code) => code,
        Err(e) => {
            let message = SecretScrubber::new().scrub(&e.to_string());
            tracing::debug!(error = %message, "command failed");
            eprintln!("Error: {}", message);
            ExitCode::from_error(&e)
        }
    }
}
