//! Core traits defined in `chathub-core` and implemented by other crates.

pub mod message_store;
pub mod user_directory;

pub use message_store::MessageStore;
pub use user_directory::UserDirectory;
