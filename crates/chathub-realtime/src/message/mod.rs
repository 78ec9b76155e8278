//! WebSocket event types, frame parsing, and message construction.

pub mod builder;
pub mod types;
pub mod validator;

pub use builder::build_message_pair;
pub use types::{EventName, InboundEvent, OutboundFrame};
pub use validator::parse_inbound;
