//! Credential holder and strongly typed Riot identifiers.

pub mod credential;
pub mod id;

pub use credential::*;
pub use id::*;
