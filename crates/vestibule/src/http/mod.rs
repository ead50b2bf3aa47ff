//! HTTP transport for the auth endpoints.

mod client;
pub mod endpoints;

pub use client::ApiClient;
