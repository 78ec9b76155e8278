//! WebSocket connection management: handles, registry, authentication.

pub mod authenticator;
pub mod handle;
pub mod registry;

pub use handle::ConnectionHandle;
pub use registry::ConnectionRegistry;
