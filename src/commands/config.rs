use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use taskwatch::config;
use tracing::info;

/// Execute the config show command
///
/// Prints the effective configuration (file plus environment overrides) as TOML
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;

    println!("{}", "Current Configuration:".green().bold());
    println!();
    println!("{}", toml::to_string_pretty(&cfg)?);

    Ok(())
}
