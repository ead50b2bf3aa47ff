//! Credential types and the credential holder.

mod credentials;
mod holder;
mod tokens;

pub use credentials::Credentials;
pub use holder::CredentialHolder;
pub use tokens::{AccessToken, RefreshToken};
