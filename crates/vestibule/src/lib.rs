//! vestibule - Client-side session and authorization core
//!
//! This library owns the lifecycle of a signed-in identity for a multi-tenant
//! application: issuing and holding credentials, resolving what the identity
//! is allowed to do, and enforcing the password-rotation policy. Everything
//! flows through a [`SessionManager`], independent of any particular UI.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vestibule::{Credentials, MemoryStorage, ServerUrl, SessionManager, classify};
//!
//! # async fn example() -> Result<(), vestibule::Error> {
//! let server = ServerUrl::new("https://app.example.com")?;
//! let manager = SessionManager::new(server, Arc::new(MemoryStorage::new()));
//!
//! // Rehydrate any persisted session first
//! manager.initialize().await;
//!
//! if !manager.state().is_authenticated() {
//!     let credentials = Credentials::new("alice@example.com", "hunter2");
//!     if let Err(e) = manager.login(&credentials).await {
//!         // The boundary classifies raw failures before display
//!         let classified = classify(&e);
//!         eprintln!("{}: {}", classified.title, classified.message);
//!     }
//! }
//!
//! if manager.has_permission("tasks.read") {
//!     // ...
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod authz;
pub mod classify;
pub mod error;
pub mod http;
pub mod identity;
pub mod policy;
pub mod session;
pub mod storage;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{AccessToken, CredentialHolder, Credentials, RefreshToken};
pub use authz::{PermissionResolver, PermissionSet, WILDCARD};
pub use classify::{Classification, ClassifiedAction, ErrorKind, Presentation, classify};
pub use error::Error;
pub use identity::{Identity, PersonalDetails, ResourceAssignment, SnapshotCache};
pub use policy::{PasswordAudit, RotationDecision};
pub use session::{RotationPrompt, SessionManager, SessionState};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use types::ServerUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
