//! Event fanout to the live connections of a recipient set.

pub mod dispatcher;

pub use dispatcher::EventFanout;

/// Which resolved connections receive an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Every resolved connection, the originator's included.
    ToAll,
    /// Every resolved connection except the originating one.
    ToOthers,
}
