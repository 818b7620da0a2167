//! DNA Center credential CLI
//!
//! # Usage
//!
//! ```bash
//! # Validate an input configuration together with its injectors
//! dnac-credential validate --inputs inputs.yml --injectors injectors.yml --strict
//!
//! # Render the job environment (password masked unless --reveal)
//! dnac-credential render --inputs inputs.yml --injectors injectors.yml --values values.yml
//!
//! # Confirm two field orders describe the same credential
//! dnac-credential compare --inputs standard.yml --inputs legacy.yml
//!
//! # Build the inventory from controller snapshots
//! dnac-credential inventory build --config dna_center.yml \
//!     --devices devices.json --sites sites.json --topology topology.json
//! ```

use anyhow::Context;
use clap::Parser;
use dnac_credential_cli::{logging, run_cli, DnacCli};
use dnac_credential_core::ToolConfig;

fn main() -> anyhow::Result<()> {
    let config = ToolConfig::from_env();
    let cli = DnacCli::parse();

    let log_format = cli.log_format.unwrap_or(config.log_format);
    logging::init(cli.verbose, cli.quiet, log_format).context("logging setup failed")?;

    let exit_code = run_cli(cli, &config);
    std::process::exit(exit_code.into());
}
