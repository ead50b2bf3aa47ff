//! Command implementations.

pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod status;
pub mod whoami;
