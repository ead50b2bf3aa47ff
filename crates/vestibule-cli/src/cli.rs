//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::login::LoginArgs;
use crate::commands::register::RegisterArgs;

/// Session and authorization CLI for a vestibule-backed application.
#[derive(Parser, Debug)]
#[command(name = "vestibule")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Application server base URL
    #[arg(long, global = true, default_value = "https://app.example.com")]
    pub server: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and persist the session
    Login(LoginArgs),
    /// Create a new account
    Register(RegisterArgs),
    /// Show the signed-in identity
    Whoami,
    /// Exchange the refresh credential for a new access credential
    Refresh,
    /// Show session state, permissions, and rotation status
    Status,
    /// Sign out and clear the persisted session
    Logout,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
