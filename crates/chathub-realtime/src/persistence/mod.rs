//! Off-path message persistence.

pub mod memory;
pub mod queue;

pub use memory::MemoryMessageStore;
pub use queue::MessagePersistor;
