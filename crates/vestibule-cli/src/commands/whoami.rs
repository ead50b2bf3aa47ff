//! Whoami command implementation.

use anyhow::Result;

use vestibule::SessionState;

use crate::output;
use crate::session;

pub async fn run(server: &str) -> Result<()> {
    let manager = session::manager(server)?;
    manager.initialize().await;

    match manager.state() {
        SessionState::Authenticated(identity) => {
            output::field("Email", &identity.email);
            output::field("Role", identity.role());
            output::field("Active", if identity.is_active { "yes" } else { "no" });
            for assignment in &identity.resources {
                let name = assignment
                    .resource_name
                    .as_deref()
                    .unwrap_or(&assignment.resource_id);
                output::field(name, &assignment.role);
            }
        }
        SessionState::DegradedAuthenticated(identity) => {
            output::field("Email", &identity.email);
            output::field("Role", identity.role());
            output::field("Mode", "degraded (cached or synthesized identity)");
        }
        _ => {
            output::error("Not signed in");
        }
    }

    Ok(())
}
