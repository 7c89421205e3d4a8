//! Fire Gateway - LAN classroom file sharing
//!
//! Operator entry point: runs one gateway call and prints the JSON result.

mod app;
mod cli;

use anyhow::Result;
use clap::Parser;
use fire_core::{Gateway, GatewayConfig, GatewayError};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging and panic hook first
    let _log_guard = fire_log::init()?;

    tracing::info!("Fire Gateway starting...");

    // A config file that exists but cannot be read must not silently fall
    // back to the default root
    let mut config = match &cli.config {
        Some(path) => GatewayConfig::load_from(path),
        None => GatewayConfig::load(),
    }
    .map_err(|e| {
        tracing::error!("Failed to load configuration: {:#}", e);
        e
    })?;

    if let Some(root) = cli.root {
        config.general.root_dir = root;
        config.absolutize_root()?;
    }

    if let Err(e) = fire_log::cleanup_old_logs(config.logging.retention_days) {
        tracing::warn!("Failed to cleanup old logs: {}", e);
    }

    fire_log::set_crash_context("root", config.general.root_dir.display().to_string());
    fire_log::set_crash_context("command", format!("{:?}", cli.command));

    config.ensure_root()?;
    let gateway = Gateway::new(&config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = app::run(&gateway, &config, cli.config.as_deref(), cli.command, &mut out) {
        match e.downcast_ref::<GatewayError>() {
            Some(err) if err.is_client_error() => tracing::warn!("Command rejected: {}", err),
            _ => tracing::error!("Command failed: {:#}", e),
        }
        return Err(e);
    }

    Ok(())
}
