//! Session lifecycle: state machine, manager, and observables.

mod manager;

pub use manager::{MAX_BEARER_HEADER_BYTES, SessionManager};

use crate::identity::Identity;

/// The externally observable session state.
///
/// Derived, never stored: the manager recomputes it on every transition.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionState {
    /// `initialize()` has not run yet.
    Uninitialized,
    /// The single-flight initialization sequence is in progress.
    Initializing,
    /// Signed in with a live-fetched identity.
    Authenticated(Identity),
    /// Signed in with a synthesized or cached identity because the live
    /// identity fetch was skipped or failed.
    DegradedAuthenticated(Identity),
    /// No valid session.
    Unauthenticated,
}

impl SessionState {
    /// True for both full and degraded authentication.
    pub fn is_authenticated(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticated(_) | SessionState::DegradedAuthenticated(_)
        )
    }

    /// The current identity, if authenticated.
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity)
            | SessionState::DegradedAuthenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Everything the UI needs to show the password-rotation prompt.
#[derive(Clone, Debug, PartialEq)]
pub struct RotationPrompt {
    /// Display role of the identity the prompt is for.
    pub role: String,
    /// Whole days since the last rotation; `None` if never rotated.
    pub last_update_days: Option<i64>,
}
