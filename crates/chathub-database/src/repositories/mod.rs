//! Repository implementations of the core collaborator traits.

pub mod message;
pub mod user;
