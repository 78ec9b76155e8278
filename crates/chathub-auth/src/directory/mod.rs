//! User directory backends.

pub mod memory;

pub use memory::MemoryUserDirectory;
