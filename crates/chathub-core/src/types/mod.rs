//! Core type definitions used across the ChatHub workspace.

pub mod id;
pub mod message;
pub mod principal;

pub use id::*;
pub use message::{Attachment, MessageRecord, NewMessage};
pub use principal::Principal;
