//! Error classification for the UI boundary.
//!
//! Maps a raw failure to a closed set of error kinds via a fixed, ordered
//! list of case-insensitive substring rules, first match wins. One case is
//! promoted from a blocking error to an actionable notification: a 401 on an
//! unverified account, where the useful response is resending the
//! verification email rather than interrupting the user.

use crate::error::Error;

/// The closed set of error kinds surfaced to the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Unverified,
    Inactive,
    Blocked,
    Credentials,
    Network,
    Generic,
}

/// How the classification should be presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presentation {
    /// An interruptive error: modal with title, message, optional action.
    Blocking,
    /// A dismissible, re-triggerable notification with an action.
    Notification,
}

/// The action attached to an actionable classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClassifiedAction {
    /// Offer to resend the account verification email.
    ResendVerification,
}

impl ClassifiedAction {
    /// The label the UI should put on the action.
    pub fn label(&self) -> &'static str {
        match self {
            ClassifiedAction::ResendVerification => "Resend verification email",
        }
    }
}

/// A classified failure, ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub kind: ErrorKind,
    pub title: String,
    pub message: String,
    pub presentation: Presentation,
    pub action: Option<ClassifiedAction>,
}

const DEFAULT_MESSAGE: &str = "An unexpected error occurred. Please try again.";

fn blocking(kind: ErrorKind, title: &str, message: &str) -> Classification {
    Classification {
        kind,
        title: title.to_string(),
        message: message.to_string(),
        presentation: Presentation::Blocking,
        action: None,
    }
}

/// True if `message` contains any of `needles`, case-insensitively.
/// `message` must already be lowercased.
fn matches_any(message: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| message.contains(n))
}

/// Classify a raw failure for display at the UI boundary.
///
/// Pure: inspects only the error's status code and message.
pub fn classify(error: &Error) -> Classification {
    let (status, raw_message, is_network) = match error {
        Error::Transport(t) => (None, Some(t.to_string()), t.is_network()),
        Error::Protocol(p) => (
            Some(p.status),
            p.display_message().map(|m| m.to_string()),
            false,
        ),
        other => (None, Some(other.to_string()), false),
    };

    let message = raw_message.as_deref().unwrap_or("").to_lowercase();

    // Rule 1: 401 on an unverified account is promoted to an actionable
    // notification rather than a blocking error.
    if status == Some(401)
        && matches_any(
            &message,
            &["not active and unverified", "unverified", "not active"],
        )
    {
        return Classification {
            kind: ErrorKind::Unverified,
            title: "Verify your email".to_string(),
            message: "Your account has not been verified yet. Resend the verification \
                      email to continue."
                .to_string(),
            presentation: Presentation::Notification,
            action: Some(ClassifiedAction::ResendVerification),
        };
    }

    // Rule 2: same condition without the 401 stays a blocking error.
    if matches_any(&message, &["verification failed", "unverified"]) {
        return blocking(
            ErrorKind::Unverified,
            "Account not verified",
            "Your account has not been verified. Check your inbox for the verification email.",
        );
    }

    // Rule 3
    if matches_any(&message, &["account is deactivated", "not active"]) {
        return blocking(
            ErrorKind::Inactive,
            "Account deactivated",
            "Your account has been deactivated. Contact your administrator.",
        );
    }

    // Rule 4
    if matches_any(&message, &["account is blocked"]) {
        return blocking(
            ErrorKind::Blocked,
            "Account blocked",
            "Your account has been blocked. Contact your administrator.",
        );
    }

    // Rule 5
    if matches_any(&message, &["account is pending"]) {
        return blocking(
            ErrorKind::Inactive,
            "Account pending approval",
            "Your account is awaiting approval. Try again once it has been approved.",
        );
    }

    // Rule 6
    if matches_any(&message, &["account is closed"]) {
        return blocking(
            ErrorKind::Blocked,
            "Account closed",
            "This account has been closed.",
        );
    }

    // Rule 7
    if matches_any(&message, &["invalid credentials", "doesn't exist"]) {
        return blocking(
            ErrorKind::Credentials,
            "Sign-in failed",
            "Invalid email or password.",
        );
    }

    // Rule 8: token problems get session-expired framing.
    if matches_any(&message, &["no token provided", "invalid token", "token is invalid"]) {
        return blocking(
            ErrorKind::Generic,
            "Session expired",
            "Your session has expired. Sign in again to continue.",
        );
    }

    // Rule 9
    if is_network || matches_any(&message, &["network error", "timeout"]) {
        return blocking(
            ErrorKind::Network,
            "Connection problem",
            "Could not reach the server. Check your connection and try again.",
        );
    }

    // Rule 10: registration conflict framing.
    if matches_any(&message, &["user already exists"]) {
        return blocking(
            ErrorKind::Generic,
            "Registration failed",
            "An account with this email already exists.",
        );
    }

    // Rule 11: fallback uses the raw message verbatim.
    let fallback = match raw_message {
        Some(m) if !m.is_empty() => m,
        _ => DEFAULT_MESSAGE.to_string(),
    };
    blocking(ErrorKind::Generic, "Something went wrong", &fallback)
}
