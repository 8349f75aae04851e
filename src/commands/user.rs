use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use taskwatch::{config, db, services::auth::hash_password, store::SqliteUserStore};
use tracing::info;

/// Execute the user add command
///
/// Hashes the password with argon2 and inserts the user
pub async fn add(config_path: &Path, email: &str, name: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        anyhow::bail!("Email and password are required");
    }

    let cfg = config::load_config(config_path)?;
    let pool = db::connect(&cfg.database).await?;
    let store = SqliteUserStore::new(pool.clone());

    let hash = hash_password(password)?;
    let user = store
        .insert(email.trim(), name, &hash)
        .await
        .with_context(|| format!("Failed to create user {}", email))?;

    pool.close().await;

    info!(user_id = user.id, "User created");
    println!("{} {} (id {})", "✓ Created user".green(), user.email, user.id);
    Ok(())
}
