//! SAML SP security wiring tool.
//!
//! Reads a security configuration, registers the SAML SP authentication
//! provider and listener (or authenticator) for each firewall into a
//! bootstrap service container, and reports the resulting wiring.
//! Configuration conflicts abort before anything is served.

mod container;
mod firewall;
mod saml;
mod security;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use firewall::{SecurityBuilder, SecurityConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "saml-sp-security")]
#[command(about = "Security wiring tool for SAML SP firewalls")]
struct Args {
    /// Path to the security configuration file (JSON)
    #[arg(long, env = "SECURITY_CONFIG")]
    config: PathBuf,

    /// Print the assembled container as JSON to stdout
    #[arg(long)]
    dump: bool,

    /// Enable verbose logging
    #[arg(short, long, env = "WIRING_VERBOSE")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("{}={}", env!("CARGO_CRATE_NAME"), log_level))
        .json()
        .init();

    info!(config = ?args.config, "Starting security wiring");

    let raw = std::fs::read_to_string(&args.config)
        .with_context(|| format!("Failed to read security config: {:?}", args.config))?;
    let config: SecurityConfig =
        serde_json::from_str(&raw).context("Failed to parse security config")?;

    let builder = SecurityBuilder::with_default_factories()?;
    let container = builder.build(&config)?;

    info!(
        firewalls = config.firewalls.len(),
        services = container.len(),
        mechanisms = ?builder.registry().keys(),
        "Security wiring complete"
    );

    if args.dump {
        let dump = serde_json::to_string_pretty(&container)
            .context("Failed to serialize container dump")?;
        println!("{}", dump);
    }

    Ok(())
}
