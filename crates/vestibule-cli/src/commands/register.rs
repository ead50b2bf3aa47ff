//! Register command implementation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use vestibule::{Credentials, classify};

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long)]
    pub password: String,
}

pub async fn run(args: RegisterArgs, server: &str) -> Result<()> {
    let manager = session::manager(server)?;

    eprintln!("{}", "Creating account...".dimmed());

    let credentials = Credentials::new(&args.email, &args.password);
    if let Err(e) = manager.register(&credentials).await {
        output::classified(&classify(&e));
        anyhow::bail!("registration failed");
    }

    output::success("Account created");
    println!("Check your inbox for a verification email, then sign in.");

    Ok(())
}
