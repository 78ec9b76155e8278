//! Top-level chat hub that ties together all realtime subsystems.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use chathub_core::config::{ConnectionPolicy, PersistenceConfig, RealtimeConfig};
use chathub_core::error::AppError;
use chathub_core::traits::MessageStore;
use chathub_core::types::id::{ConnectionId, UserId};
use chathub_core::types::principal::Principal;

use crate::connection::authenticator::AuthGate;
use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::ConnectionRegistry;
use crate::fanout::{DeliveryMode, EventFanout};
use crate::message::builder::build_message_pair;
use crate::message::types::{
    ChatRef, ChatSignalPayload, ErrorPayload, EventName, InboundEvent, NewMessageOut,
    NewMessagePayload, PresencePayload,
};
use crate::message::validator::parse_inbound;
use crate::metrics::{HubMetrics, MetricsSnapshot};
use crate::persistence::MessagePersistor;
use crate::presence::PresenceTracker;

/// Central hub coordinating connections, presence, fanout and persistence.
#[derive(Clone)]
pub struct ChatHub {
    /// Connection registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Presence tracker.
    pub presence: Arc<PresenceTracker>,
    /// Event fanout.
    pub fanout: Arc<EventFanout>,
    /// Message persistence queue.
    pub persistor: Arc<MessagePersistor>,
    /// Connection authentication.
    gate: AuthGate,
    /// Metrics collector.
    pub metrics: Arc<HubMetrics>,
    /// Realtime settings.
    config: RealtimeConfig,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for ChatHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatHub").finish()
    }
}

impl ChatHub {
    /// Creates the hub and starts its persistence worker.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(
        config: RealtimeConfig,
        persistence: &PersistenceConfig,
        gate: AuthGate,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(HubMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new(config.connection_policy));
        let presence = Arc::new(PresenceTracker::new());
        let fanout = Arc::new(EventFanout::new(registry.clone(), metrics.clone()));
        let persistor = Arc::new(MessagePersistor::start(store, persistence, metrics.clone()));

        info!(
            policy = ?config.connection_policy,
            backend = persistor.backend(),
            "Chat hub initialized"
        );

        Self {
            registry,
            presence,
            fanout,
            persistor,
            gate,
            metrics,
            config,
            shutdown_tx,
        }
    }

    /// Authenticates a connection attempt from its session token.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Principal, AppError> {
        let result = self.gate.authenticate(token).await;
        if result.is_err() {
            HubMetrics::inc(&self.metrics.connections_rejected);
        }
        result
    }

    /// Registers a new authenticated connection.
    ///
    /// Returns the handle and the receiver the connection's writer task
    /// drains. Under last-writer-wins, an existing registration for the
    /// same user is superseded but its connection stays open.
    pub fn connect(&self, principal: Principal) -> (Arc<ConnectionHandle>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(principal, tx));
        let user_id = handle.user_id();

        self.registry.attach(handle.clone());
        if let Some(previous) = self.registry.register(user_id, handle.id) {
            info!(
                user_id = %user_id,
                conn_id = %handle.id,
                superseded = %previous,
                "Connection superseded an earlier registration"
            );
        }
        self.metrics.record_connect();

        info!(
            conn_id = %handle.id,
            user_id = %user_id,
            name = %handle.principal.display_name,
            "Connection registered"
        );

        (handle, rx)
    }

    /// Handles one raw inbound text frame from `handle`.
    ///
    /// A malformed frame mutates nothing; an `ERROR` frame goes back to
    /// the sender and the error is returned.
    pub fn handle_inbound(&self, handle: &ConnectionHandle, raw: &str) -> Result<(), AppError> {
        match parse_inbound(raw, self.config.max_frame_bytes) {
            Ok(event) => {
                HubMetrics::inc(&self.metrics.events_received);
                self.handle_event(handle, event);
                Ok(())
            }
            Err(e) => {
                HubMetrics::inc(&self.metrics.events_rejected);
                warn!(conn_id = %handle.id, user_id = %handle.user_id(), error = %e, "Rejected inbound frame");
                self.fanout
                    .send_direct(handle, EventName::Error, &ErrorPayload::from(&e));
                Err(e)
            }
        }
    }

    /// Handles one decoded inbound event from `handle`.
    pub fn handle_event(&self, handle: &ConnectionHandle, event: InboundEvent) {
        let name = event.name();
        debug!(conn_id = %handle.id, event = %name, "Inbound event");

        match event {
            InboundEvent::NewMessage(payload) => self.on_new_message(handle, payload),
            InboundEvent::StartTyping(payload)
            | InboundEvent::StopTyping(payload)
            | InboundEvent::NewRequest(payload)
            | InboundEvent::Alert(payload)
            | InboundEvent::RefetchChats(payload) => self.on_chat_signal(handle, name, payload),
            InboundEvent::ChatJoined(payload) => {
                self.presence.mark_online(payload.user_id);
                self.push_online_users(&payload);
            }
            InboundEvent::ChatLeaved(payload) => {
                self.presence.mark_offline(payload.user_id);
                self.push_online_users(&payload);
            }
        }
    }

    fn on_new_message(&self, handle: &ConnectionHandle, payload: NewMessagePayload) {
        let NewMessagePayload {
            chat_id,
            members,
            message,
        } = payload;

        let (realtime, record) = build_message_pair(&handle.principal, chat_id, message, Vec::new());

        self.fanout.dispatch(
            EventName::NewMessage,
            &members,
            &NewMessageOut {
                chat_id,
                message: realtime,
            },
            DeliveryMode::ToAll,
            Some(handle.id),
        );
        self.fanout.dispatch(
            EventName::NewMessageAlert,
            &members,
            &ChatRef { chat_id },
            DeliveryMode::ToAll,
            Some(handle.id),
        );

        self.persistor.enqueue(record);
    }

    fn on_chat_signal(&self, handle: &ConnectionHandle, name: EventName, payload: ChatSignalPayload) {
        self.fanout.dispatch(
            name,
            &payload.members,
            &ChatRef {
                chat_id: payload.chat_id,
            },
            DeliveryMode::ToOthers,
            Some(handle.id),
        );
    }

    fn push_online_users(&self, payload: &PresencePayload) {
        let online = self.presence.snapshot();
        self.fanout.dispatch(
            EventName::OnlineUsers,
            &payload.members,
            &online,
            DeliveryMode::ToAll,
            None,
        );
    }

    /// Tears down a connection. Only the first call for a connection has
    /// any effect.
    ///
    /// Under last-writer-wins the user's registration and presence are
    /// dropped unconditionally, even when this connection had already been
    /// superseded. Under multi-device only this connection is removed and
    /// the user goes offline with their last one. Either way `ONLINE_USERS`
    /// is pushed to every other live connection.
    pub fn disconnect(&self, connection_id: ConnectionId) -> bool {
        let Some(handle) = self.registry.detach(connection_id) else {
            return false;
        };
        handle.mark_closed();
        self.metrics.record_disconnect();

        let user_id = handle.user_id();
        match self.registry.policy() {
            ConnectionPolicy::LastWriterWins => {
                self.registry.unregister(user_id);
                self.presence.mark_offline(user_id);
            }
            ConnectionPolicy::MultiDevice => {
                self.registry.unregister_connection(user_id, connection_id);
                if !self.registry.is_registered(user_id) {
                    self.presence.mark_offline(user_id);
                }
            }
        }

        let online = self.presence.snapshot();
        let notified = self
            .fanout
            .broadcast_except(EventName::OnlineUsers, &online, Some(connection_id));

        info!(
            conn_id = %connection_id,
            user_id = %user_id,
            notified,
            connected_secs = (Utc::now() - handle.connected_at).num_seconds(),
            "Connection closed"
        );
        true
    }

    /// Pushes a server-originated event to the live connections of `users`.
    ///
    /// Callers must only emit after the store mutation the event announces
    /// has committed.
    pub fn emit_event<T: Serialize>(&self, event: EventName, users: &[UserId], payload: &T) -> usize {
        self.fanout
            .dispatch(event, users, payload, DeliveryMode::ToAll, None)
    }

    /// Current online users in first-online order.
    pub fn online_users(&self) -> Vec<UserId> {
        self.presence.snapshot()
    }

    /// Metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Signals every connection task to stop, closes all handles, and
    /// drains the persistence queue.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down chat hub");

        let _ = self.shutdown_tx.send(());

        for handle in self.registry.all_handles() {
            handle.mark_closed();
        }

        self.persistor.shutdown().await;

        info!("Chat hub shut down");
        Ok(())
    }
}
