//! Login command implementation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use vestibule::{Credentials, SessionState, classify};

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: LoginArgs, server: &str) -> Result<()> {
    let manager = session::manager(server)?;
    manager.initialize().await;

    eprintln!("{}", "Signing in...".dimmed());

    let credentials = Credentials::new(&args.email, &args.password);
    if let Err(e) = manager.login(&credentials).await {
        // Boundary contract: raw failures are classified before display
        output::classified(&classify(&e));
        anyhow::bail!("sign-in failed");
    }

    output::success("Signed in");
    if let Some(identity) = manager.identity() {
        println!();
        output::field("Email", &identity.email);
        output::field("Role", identity.role());
        if matches!(manager.state(), SessionState::DegradedAuthenticated(_)) {
            output::field("Mode", "degraded (live identity fetch skipped)");
        }
    }

    if let Some(prompt) = manager.password_rotation() {
        println!();
        match prompt.last_update_days {
            Some(days) => output::error(&format!(
                "Password rotation required (last updated {} days ago)",
                days
            )),
            None => output::error("Password rotation required"),
        }
    }

    Ok(())
}
