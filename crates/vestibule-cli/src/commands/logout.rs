//! Logout command implementation.

use anyhow::Result;

use crate::output;
use crate::session;

pub async fn run(server: &str) -> Result<()> {
    let manager = session::manager(server)?;
    manager.initialize().await;

    if !manager.state().is_authenticated() {
        output::error("Not signed in");
        return Ok(());
    }

    manager.logout().await;
    output::success("Signed out");

    Ok(())
}
