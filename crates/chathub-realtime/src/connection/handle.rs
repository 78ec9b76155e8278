//! Individual WebSocket connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use chathub_core::types::id::{ConnectionId, UserId};
use chathub_core::types::principal::Principal;

/// A handle to a single WebSocket connection.
///
/// Holds the sender channel for pushing serialized frames to the
/// connection's writer task, plus the principal it authenticated as.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Authenticated principal (fixed for the connection's lifetime)
    pub principal: Principal,
    /// Sender for outbound frames
    sender: mpsc::Sender<String>,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    /// Whether the connection is still alive
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a new connection handle
    pub fn new(principal: Principal, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            principal,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// The user this connection belongs to
    pub fn user_id(&self) -> UserId {
        self.principal.user_id
    }

    /// Push a frame without waiting.
    ///
    /// Returns `false` if the connection is closed or its buffer is full;
    /// the frame is dropped in both cases.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(_) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %self.id, "Connection send buffer full, dropping frame");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                false
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as closed
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }
}
