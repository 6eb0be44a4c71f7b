//! Complyboard CLI - command-line client for the Complyboard backend.

mod commands;
mod output;

use clap::{Parser, Subcommand};

use complyboard_core::{Config, Paths};

/// Complyboard CLI - manage your session with the compliance backend.
#[derive(Parser)]
#[command(name = "complyboard")]
#[command(about = "Complyboard client for authentication and session management")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with username and password
    Login,

    /// Sign out and clear the stored session
    Logout,

    /// Check session status
    Status,

    /// Show the signed-in user
    Whoami,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    complyboard_core::init_logging(&cli.log_level);

    let config = match Paths::new().and_then(|paths| Config::load(&paths)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Login => commands::login(&config, &cli.format).await,
        Commands::Logout => commands::logout(&config, &cli.format).await,
        Commands::Status => commands::status(&config, &cli.format).await,
        Commands::Whoami => commands::whoami(&config, &cli.format).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
