use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use taskwatch::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    // `start` initializes tracing itself once the configured level and format are known
    if !matches!(args.get_command(), cli::Commands::Start) {
        init_tracing("info", "text");
    }

    match args.get_command() {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
        },
        cli::Commands::User { action } => match action {
            cli::UserCommands::Add {
                email,
                name,
                password,
            } => commands::user::add(&args.config, &email, &name, &password).await?,
        },
        cli::Commands::Version => {
            println!("TaskWatch v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
