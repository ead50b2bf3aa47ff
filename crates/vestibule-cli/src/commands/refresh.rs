//! Refresh command implementation.

use anyhow::Result;
use colored::Colorize;

use crate::output;
use crate::session;

pub async fn run(server: &str) -> Result<()> {
    let manager = session::manager(server)?;
    manager.initialize().await;

    if !manager.state().is_authenticated() {
        output::error("Not signed in");
        return Ok(());
    }

    eprintln!("{}", "Refreshing session...".dimmed());
    manager.refresh().await;

    if manager.state().is_authenticated() {
        output::success("Session refreshed");
    } else {
        // Refresh degrades silently; the observable state tells the story
        output::error("Refresh failed; signed out");
    }

    Ok(())
}
