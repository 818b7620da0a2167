//! Tracing subscriber setup
//!
//! Logs go to stderr so JSON and shell output on stdout stay clean.
//! `RUST_LOG` directives are honored; `-v`/`-q` set the default level.

use anyhow::anyhow;
use dnac_credential_core::LogFormat;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Default level for a verbosity count
pub fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the global subscriber
pub fn init(verbose: u8, quiet: bool, format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(level_for(verbose, quiet).into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install {} log subscriber: {}", format, e))
}
