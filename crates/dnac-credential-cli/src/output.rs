//! Output formatting for the `dnac-credential` CLI
//!
//! Structured output as JSON or YAML, and human-readable tables with
//! severity-based coloring.

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

use dnac_credential_core::inventory::{DeviceListQuery, Inventory, InventoryOptionsSummary};
use dnac_credential_core::{
    CredentialError, Result, ValidationFinding, ValidationResult, ValidationSeverity,
};

/// Output format options for CLI results
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// Human-readable table format with colors
    #[default]
    Table,
    /// JSON format for machine processing
    Json,
    /// YAML format
    Yaml,
}

/// Print any serializable value as JSON or YAML
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(value)
                .map_err(|e| CredentialError::SerializationError(e.to_string()))?;
            print!("{}", yaml);
        }
        _ => {
            let json = serde_json::to_string_pretty(value)
                .map_err(|e| CredentialError::SerializationError(e.to_string()))?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Validation report for rendering
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub findings: Vec<ValidationFinding>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ValidationReport {
    pub fn from_result(result: &ValidationResult) -> Self {
        let count = |severity: ValidationSeverity| {
            result
                .findings
                .iter()
                .filter(|f| f.severity == severity)
                .count()
        };
        let error_count = count(ValidationSeverity::Error);
        let warning_count = count(ValidationSeverity::Warning);
        let info_count = count(ValidationSeverity::Info);

        let summary = if result.valid && warning_count == 0 {
            "Credential type is valid".to_string()
        } else if result.valid {
            format!("Credential type is valid with {} warning(s)", warning_count)
        } else {
            format!(
                "Credential type has {} error(s) and {} warning(s)",
                error_count, warning_count
            )
        };

        Self {
            valid: result.valid,
            error_count,
            warning_count,
            info_count,
            findings: result.findings.clone(),
            summary,
            duration_ms: result.duration_ms,
        }
    }

    pub fn render(&self, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Table => {
                self.render_table();
                Ok(())
            }
            other => print_structured(self, other),
        }
    }

    fn render_table(&self) {
        let mut stdout = io::stdout();

        writeln!(stdout).ok();
        writeln!(stdout, "{}", "Validation Results".cyan().bold()).ok();
        writeln!(stdout, "{}", "=".repeat(60)).ok();
        writeln!(stdout).ok();

        let status = if self.valid { "+".green() } else { "x".red() };
        writeln!(stdout, "{} {}", status, self.summary).ok();
        writeln!(stdout).ok();

        if self.findings.is_empty() {
            return;
        }

        writeln!(stdout, "{}", "Findings:".cyan().bold()).ok();
        writeln!(stdout, "{}", "-".repeat(60)).ok();
        for (index, finding) in self.findings.iter().enumerate() {
            let (icon, code) = match finding.severity {
                ValidationSeverity::Error => ("x".red(), finding.code.red()),
                ValidationSeverity::Warning => ("!".yellow(), finding.code.yellow()),
                ValidationSeverity::Info => ("i".blue(), finding.code.blue()),
            };
            writeln!(stdout, "{}. {} [{}] {}", index + 1, icon, code, finding.message).ok();
            writeln!(stdout, "   {} {}", "Path:".dimmed(), finding.path).ok();
            if let Some(suggestion) = &finding.suggestion {
                writeln!(stdout, "   {} {}", "Fix:".green(), suggestion).ok();
            }
        }
        writeln!(stdout).ok();
    }
}

/// Result of comparing two or more input configurations
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub equivalent: bool,
    pub documents: Vec<DocumentFingerprint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentFingerprint {
    pub path: String,
    pub field_order: Vec<String>,
    pub fingerprint: String,
}

impl ComparisonReport {
    pub fn render(&self, format: OutputFormat) -> Result<()> {
        if format != OutputFormat::Table {
            return print_structured(self, format);
        }

        let status = if self.equivalent {
            "EQUIVALENT".green().bold()
        } else {
            "DIFFERENT".red().bold()
        };
        println!("{}", "Input Configuration Comparison".cyan().bold());
        println!();
        println!("Status: {}", status);
        println!();
        for doc in &self.documents {
            println!("  {} {}", "-".blue(), doc.path.bold());
            println!("    {} {}", "Order:".dimmed(), doc.field_order.join(", "));
            println!("    {} {}", "SHA-256:".dimmed(), doc.fingerprint);
        }
        Ok(())
    }
}

/// Print resolved inventory options
pub fn render_inventory_options(
    summary: &InventoryOptionsSummary,
    pages: &[DeviceListQuery],
    format: OutputFormat,
) -> Result<()> {
    if format != OutputFormat::Table {
        #[derive(Serialize)]
        struct Report<'a> {
            options: &'a InventoryOptionsSummary,
            device_queries: &'a [DeviceListQuery],
        }
        return print_structured(
            &Report {
                options: summary,
                device_queries: pages,
            },
            format,
        );
    }

    println!("{}", "dna_center Inventory Source".cyan().bold());
    println!();
    println!("  {:<18} {}", "Controller:", summary.base_url);
    println!("  {:<18} {}", "API version:", summary.dnac_version);
    println!("  {:<18} {}", "Username:", summary.username);
    println!("  {:<18} {}", "Password:", summary.password.dimmed());
    println!("  {:<18} {}", "Validate certs:", summary.validate_certs);
    println!("  {:<18} {}", "Mgmt interface:", summary.use_dnac_mgmt_int);
    println!("  {:<18} {}", "Record limit:", summary.api_record_limit);
    println!("  {:<18} {}", "Families:", summary.device_family.join(", "));
    if let Some(toplevel) = &summary.toplevel {
        println!("  {:<18} {}", "Top-level group:", toplevel);
    }
    if let Some(filter) = &summary.hostname_filter {
        println!("  {:<18} {}", "Hostname filter:", filter);
    }
    if let Some(location) = &summary.location_name {
        println!("  {:<18} {}", "Location:", location);
    }
    println!("  {:<18} {}", "Strict:", summary.strict);
    for keyed in &summary.keyed_groups {
        println!(
            "  {:<18} {} {}",
            "Keyed group:",
            keyed.key,
            format!("(prefix '{}', separator '{}')", keyed.prefix, keyed.separator).dimmed()
        );
    }

    if !pages.is_empty() {
        println!();
        println!("{}", "Device list calls:".cyan().bold());
        for (index, query) in pages.iter().enumerate() {
            println!(
                "  {}. offset={} limit={}",
                index + 1,
                query.page.offset,
                query.page.limit
            );
        }
    }
    Ok(())
}

/// Print a built inventory
pub fn render_inventory(inventory: &Inventory, format: OutputFormat) -> Result<()> {
    if format != OutputFormat::Table {
        return print_structured(&inventory.to_json(), format);
    }

    println!("{}", "Inventory".cyan().bold());
    println!();
    for root in inventory.top_level_groups() {
        print_group_tree(inventory, root, "", true);
    }
    println!();
    println!("  Hosts:  {}", inventory.host_count());
    println!("  Groups: {}", inventory.groups().len());
    Ok(())
}

fn print_group_tree(inventory: &Inventory, name: &str, prefix: &str, is_last: bool) {
    let connector = if is_last { "└── " } else { "├── " };
    let child_prefix = if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };

    let Some(group) = inventory.group(name) else {
        return;
    };
    println!("{}{}{}", prefix, connector, name.green().bold());

    let entries = group.children.len() + group.hosts.len();
    let mut position = 0;
    for child in &group.children {
        position += 1;
        print_group_tree(inventory, child, &child_prefix, position == entries);
    }
    for host in &group.hosts {
        position += 1;
        let connector = if position == entries { "└── " } else { "├── " };
        let address = inventory
            .host_var(host, "ansible_host")
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        println!("{}{}{} {}", child_prefix, connector, host, address.dimmed());
    }
}
