//! CLI command definitions for `dnac-credential`
//!
//! Clap-based commands for validating, rendering, comparing and exporting the
//! credential type, and for driving the inventory source offline.

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use dnac_credential_core::inventory::{
    devices_from_value, sites_from_value, topology_from_value, InventoryBuilder,
};
use dnac_credential_core::{
    loader, CredentialDefinition, CredentialError, CredentialInputs, CredentialType,
    InjectorMapping, InjectorRenderer, InventoryOptions, LogFormat, ProcessEnv, Result,
    ToolConfig, ValidationContext, ValidationSeverity, Validator, Variant,
};

use super::output::{
    print_structured, render_inventory, render_inventory_options, ComparisonReport,
    DocumentFingerprint, OutputFormat, ValidationReport,
};
use super::ExitCode;

/// DNA Center credential tool
///
/// Validate and render the custom credential type behind the dna_center
/// inventory source, and resolve the inventory source against it.
#[derive(Parser, Debug)]
#[command(name = "dnac-credential")]
#[command(about = "Validate and render the DNA Center credential type", long_about = None)]
#[command(version)]
pub struct DnacCli {
    /// Output verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log format (text or json)
    #[arg(long, global = true, env = "DNAC_CREDENTIAL_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate an input configuration and its injectors
    ///
    /// Without --injectors only the input schema is checked, unless the
    /// inputs file is a full credential type document.
    Validate {
        /// Input configuration or full credential type document
        #[arg(short, long)]
        inputs: PathBuf,

        /// Injector configuration
        #[arg(short = 'j', long)]
        injectors: Option<PathBuf>,

        /// Output format for validation results
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Accept fields and variables beyond the DNA Center contract
        #[arg(long)]
        allow_extra_fields: bool,
    },

    /// Render the environment a job would receive
    Render {
        /// Input configuration or full credential type document
        #[arg(short, long)]
        inputs: PathBuf,

        /// Injector configuration
        #[arg(short = 'j', long)]
        injectors: Option<PathBuf>,

        /// Credential values (field id to value)
        #[arg(long)]
        values: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "env")]
        format: RenderFormat,

        /// Print secret values in cleartext
        #[arg(long)]
        reveal: bool,
    },

    /// Check that input configurations describe the same credential
    Compare {
        /// Input configurations to compare (at least two)
        #[arg(short, long, num_args = 1.., required = true)]
        inputs: Vec<PathBuf>,

        /// Output format for the comparison
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Print a built-in credential type
    Export {
        /// Field order (standard or legacy)
        #[arg(long, default_value = "standard")]
        variant: Variant,

        /// Credential type name
        #[arg(long)]
        name: Option<String>,

        /// Document format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ExportFormat,
    },

    /// Inventory source commands
    Inventory {
        #[command(subcommand)]
        command: InventoryCommands,
    },
}

/// `inventory` subcommands
#[derive(Subcommand, Debug)]
pub enum InventoryCommands {
    /// Resolve dna_center.yml against the process environment
    Options {
        /// Inventory source file (must end with dna_center.yml)
        #[arg(short, long)]
        config: PathBuf,

        /// Show the device list calls needed for this many devices
        #[arg(long)]
        device_count: Option<u64>,

        /// Output format
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Build the inventory from controller snapshots
    Build {
        /// Inventory source file (must end with dna_center.yml)
        #[arg(short, long)]
        config: PathBuf,

        /// Device list snapshot
        #[arg(long)]
        devices: PathBuf,

        /// Site topology snapshot
        #[arg(long)]
        sites: PathBuf,

        /// Physical topology snapshot
        #[arg(long)]
        topology: PathBuf,

        /// Output format (defaults to inventory JSON)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

/// Output formats for `render`
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum RenderFormat {
    /// `export NAME='value'` lines
    #[default]
    Env,
    /// JSON object of variable names to values
    Json,
    /// Human-readable table
    Table,
}

/// Output formats for `export`
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum ExportFormat {
    #[default]
    Yaml,
    Json,
}

/// Load the input configuration and, if available, the injectors
///
/// Injectors come from `injectors` when given, else from the inputs file
/// when it is a full credential type document.
fn load_documents(
    inputs: &Path,
    injectors: Option<&Path>,
) -> Result<(CredentialDefinition, Option<InjectorMapping>)> {
    let value = loader::read_value(inputs)?;
    let embedded = value.get("injectors").is_some();
    let definition = loader::definition_from_value(value.clone())?;

    let mapping = match injectors {
        Some(path) => Some(loader::load_injectors(path)?),
        None if embedded => Some(loader::injectors_from_value(value)?),
        None => None,
    };
    Ok((definition, mapping))
}

/// Execute the validate command
pub fn execute_validate(
    inputs: &Path,
    injectors: Option<&Path>,
    format: OutputFormat,
    strict: bool,
    allow_extra_fields: bool,
) -> Result<ExitCode> {
    info!(inputs = %inputs.display(), strict, "validating credential type");
    let (definition, mapping) = load_documents(inputs, injectors)?;

    let context = ValidationContext::new()
        .with_strict_mode(strict)
        .with_extra_fields_allowed(allow_extra_fields);
    let result = Validator::new(context).validate(&definition, mapping.as_ref());

    ValidationReport::from_result(&result).render(format)?;

    let has_errors = result
        .findings
        .iter()
        .any(|f| f.severity == ValidationSeverity::Error);
    Ok(ExitCode::from_validation_result(has_errors, result.has_warnings()))
}

/// Execute the render command
pub fn execute_render(
    inputs: &Path,
    injectors: Option<&Path>,
    values: &Path,
    format: RenderFormat,
    reveal: bool,
    config: &ToolConfig,
) -> Result<ExitCode> {
    let (definition, mapping) = load_documents(inputs, injectors)?;
    let mapping = mapping.ok_or_else(|| {
        CredentialError::invalid_input(
            "rendering needs an injector configuration: pass --injectors or a full credential type document",
        )
    })?;

    let validator = Validator::new(ValidationContext::from_config(config));
    let renderer = InjectorRenderer::checked(&definition, &mapping, &validator)?;
    let values = loader::load_values(values)?;
    let env = renderer.render(&CredentialInputs::from_values(&definition, values))?;

    if reveal {
        warn!("printing secret values in cleartext");
    }

    match format {
        RenderFormat::Env => println!("{}", env.to_shell_exports(reveal)),
        RenderFormat::Json => print_structured(&env.to_map(reveal), OutputFormat::Json)?,
        RenderFormat::Table => {
            println!("{}", "Injected Environment".cyan().bold());
            println!();
            for (name, value) in env.iter() {
                let shown = if reveal {
                    value.expose().to_string()
                } else {
                    value.to_string()
                };
                let marker = if value.is_secret() {
                    "secret".yellow().to_string()
                } else {
                    String::new()
                };
                println!("  {:<16} {} {}", name.bold(), shown, marker);
            }
        }
    }
    Ok(ExitCode::Success)
}

/// Execute the compare command
pub fn execute_compare(paths: &[PathBuf], format: OutputFormat) -> Result<ExitCode> {
    if paths.len() < 2 {
        return Err(CredentialError::invalid_input(
            "At least 2 input configurations are required for comparison",
        ));
    }

    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let definition = loader::load_definition(path)?;
        documents.push(DocumentFingerprint {
            path: path.display().to_string(),
            field_order: definition.ids().map(str::to_string).collect(),
            fingerprint: definition.fingerprint()?,
        });
    }

    let equivalent = documents
        .windows(2)
        .all(|pair| pair[0].fingerprint == pair[1].fingerprint);
    info!(documents = documents.len(), equivalent, "input configurations compared");

    ComparisonReport {
        equivalent,
        documents,
    }
    .render(format)?;

    Ok(ExitCode::from_validation_result(!equivalent, false))
}

/// Execute the export command
pub fn execute_export(variant: Variant, name: &str, format: ExportFormat) -> Result<ExitCode> {
    let mut credential_type = CredentialType::builtin(variant);
    credential_type.name = name.to_string();

    let format = match format {
        ExportFormat::Yaml => OutputFormat::Yaml,
        ExportFormat::Json => OutputFormat::Json,
    };
    print_structured(&credential_type, format)?;
    Ok(ExitCode::Success)
}

/// Execute `inventory options`
pub fn execute_inventory_options(
    config: &Path,
    device_count: Option<u64>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let options = InventoryOptions::load(config, &ProcessEnv)?;
    let queries = device_count
        .map(|count| options.device_queries(count))
        .unwrap_or_default();
    render_inventory_options(&options.summary(), &queries, format)?;
    Ok(ExitCode::Success)
}

/// Execute `inventory build`
pub fn execute_inventory_build(
    config: &Path,
    devices: &Path,
    sites: &Path,
    topology: &Path,
    format: OutputFormat,
) -> Result<ExitCode> {
    let options = InventoryOptions::load(config, &ProcessEnv)?;
    let devices = devices_from_value(loader::read_value(devices)?)?;
    let sites = sites_from_value(loader::read_value(sites)?)?;
    let topology = topology_from_value(loader::read_value(topology)?)?;

    let inventory = InventoryBuilder::from_options(&options)
        .with_sites(sites)
        .with_topology(topology)
        .build(&devices)?;

    render_inventory(&inventory, format)?;
    Ok(ExitCode::Success)
}
