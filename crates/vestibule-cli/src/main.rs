//! vestibule - CLI boundary for the session core.
//!
//! This is a thin wrapper over the `vestibule` library, intended for manual
//! exploration and debugging of a session against an application server.

mod cli;
mod commands;
mod output;
mod session;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Login(args) => commands::login::run(args, &cli.server).await,
        Commands::Register(args) => commands::register::run(args, &cli.server).await,
        Commands::Whoami => commands::whoami::run(&cli.server).await,
        Commands::Refresh => commands::refresh::run(&cli.server).await,
        Commands::Status => commands::status::run(&cli.server).await,
        Commands::Logout => commands::logout::run(&cli.server).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}
