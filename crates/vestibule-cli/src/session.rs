//! Construction of the session manager over the persisted CLI session.

use std::sync::Arc;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use vestibule::{FileStorage, ServerUrl, SessionManager};

/// Build a session manager persisting under the CLI's data directory.
pub fn manager(server: &str) -> Result<SessionManager> {
    let server = ServerUrl::new(server).context("Invalid server URL")?;

    let dirs =
        ProjectDirs::from("", "", "vestibule").context("Could not determine data directory")?;
    let storage =
        FileStorage::new(dirs.data_dir()).context("Failed to create data directory")?;

    Ok(SessionManager::new(server, Arc::new(storage)))
}
