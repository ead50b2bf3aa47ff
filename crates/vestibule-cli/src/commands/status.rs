//! Status command implementation.

use anyhow::Result;

use vestibule::SessionState;

use crate::output;
use crate::session;

pub async fn run(server: &str) -> Result<()> {
    let manager = session::manager(server)?;
    manager.initialize().await;

    let state = manager.state();
    let label = match &state {
        SessionState::Authenticated(_) => "authenticated",
        SessionState::DegradedAuthenticated(_) => "authenticated (degraded)",
        SessionState::Unauthenticated => "unauthenticated",
        SessionState::Uninitialized | SessionState::Initializing => "initializing",
    };
    output::field("State", label);

    if let Some(identity) = state.identity() {
        output::field("Email", &identity.email);
        output::field("Role", identity.role());
    }

    if let Some(permissions) = manager.permissions() {
        println!();
        output::json_pretty(&permissions)?;
    }

    if let Some(prompt) = manager.password_rotation() {
        println!();
        match prompt.last_update_days {
            Some(days) => output::field(
                "Password rotation",
                &format!("required ({} days since last update)", days),
            ),
            None => output::field("Password rotation", "required"),
        }
    }

    Ok(())
}
