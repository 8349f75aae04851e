use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "taskwatch", version, about = "Task tracking service with per-task timers")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server (default)
    Start,

    /// Test configuration file validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// User account management
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display the effective configuration
    Show,
}

#[derive(Subcommand, Debug, Clone)]
pub enum UserCommands {
    /// Create a user that can log in
    Add {
        #[arg(long)]
        email: String,

        #[arg(long)]
        name: String,

        /// Plain-text password; stored as an argon2 hash
        #[arg(long, env = "TASKWATCH_USER_PASSWORD")]
        password: String,
    },
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start)
    }
}
