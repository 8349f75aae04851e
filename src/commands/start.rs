use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use taskwatch::{config, init_tracing, server};
use tracing::info;

/// Execute the start command
///
/// Loads configuration, initializes tracing from it and serves until shutdown.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting TaskWatch...".green());

    let cfg = config::load_config(config_path)?;
    init_tracing(&cfg.server.log_level, &cfg.server.log_format);

    info!(
        config = %config_path.display(),
        audit_enabled = cfg.observability.audit_enabled,
        "Configuration loaded"
    );

    server::start_server(cfg).await
}
