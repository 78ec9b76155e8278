//! # chathub-realtime
//!
//! Real-time presence and fanout hub for ChatHub. Provides:
//!
//! - Session-cookie authentication of WebSocket connections
//! - A user → connection registry with last-writer-wins or multi-device policy
//! - The online-users presence set driven by chat join/leave signals
//! - Typed event fanout to the live connections of a recipient set
//! - Fire-and-forget message persistence off the delivery path

pub mod connection;
pub mod fanout;
pub mod message;
pub mod metrics;
pub mod persistence;
pub mod presence;
pub mod server;

pub use connection::authenticator::AuthGate;
pub use connection::registry::ConnectionRegistry;
pub use fanout::{DeliveryMode, EventFanout};
pub use persistence::{MemoryMessageStore, MessagePersistor};
pub use presence::PresenceTracker;
pub use server::ChatHub;
pub use message::types::EventName;
pub use metrics::{HubMetrics, MetricsSnapshot};
