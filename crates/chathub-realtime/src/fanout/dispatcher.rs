//! Event dispatcher — resolves recipients and pushes frames.
//!
//! Dispatch never awaits: each push is a `try_send` into the target
//! connection's bounded buffer. A payload is serialized once per dispatch.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, trace};

use chathub_core::types::id::{ConnectionId, UserId};

use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::ConnectionRegistry;
use crate::message::types::{EventName, OutboundFrame};
use crate::metrics::HubMetrics;

use super::DeliveryMode;

/// Routes events to connections through the registry.
#[derive(Debug)]
pub struct EventFanout {
    /// Connection registry used for resolution and delivery
    registry: Arc<ConnectionRegistry>,
    /// Shared metrics
    metrics: Arc<HubMetrics>,
}

impl EventFanout {
    /// Create a new fanout
    pub fn new(registry: Arc<ConnectionRegistry>, metrics: Arc<HubMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Deliver `payload` as `event` to the connections registered for
    /// `recipients`.
    ///
    /// With [`DeliveryMode::ToOthers`], `origin` is skipped. Returns the
    /// number of connections the frame was pushed to; zero resolved
    /// connections is a no-op.
    pub fn dispatch<T: Serialize>(
        &self,
        event: EventName,
        recipients: &[UserId],
        payload: &T,
        mode: DeliveryMode,
        origin: Option<ConnectionId>,
    ) -> usize {
        let targets: Vec<Arc<ConnectionHandle>> = self
            .registry
            .resolve(recipients)
            .into_iter()
            .filter(|id| mode == DeliveryMode::ToAll || Some(*id) != origin)
            .filter_map(|id| self.registry.handle(id))
            .collect();

        if targets.is_empty() {
            debug!(event = %event, recipients = recipients.len(), "No live recipients, skipping dispatch");
            return 0;
        }

        let Some(frame) = self.encode(event, payload) else {
            return 0;
        };

        let delivered = self.push_all(&targets, &frame);
        trace!(event = %event, delivered, targets = targets.len(), "Event dispatched");
        delivered
    }

    /// Deliver `payload` to every live connection except `excluded`.
    pub fn broadcast_except<T: Serialize>(
        &self,
        event: EventName,
        payload: &T,
        excluded: Option<ConnectionId>,
    ) -> usize {
        let targets: Vec<Arc<ConnectionHandle>> = self
            .registry
            .all_handles()
            .into_iter()
            .filter(|handle| Some(handle.id) != excluded)
            .collect();

        if targets.is_empty() {
            debug!(event = %event, "No live connections, skipping broadcast");
            return 0;
        }

        let Some(frame) = self.encode(event, payload) else {
            return 0;
        };

        self.push_all(&targets, &frame)
    }

    /// Deliver `payload` to a single connection.
    pub fn send_direct<T: Serialize>(
        &self,
        handle: &ConnectionHandle,
        event: EventName,
        payload: &T,
    ) -> bool {
        let Some(frame) = self.encode(event, payload) else {
            return false;
        };
        let delivered = handle.send(frame);
        if delivered {
            HubMetrics::inc(&self.metrics.frames_sent);
        } else {
            HubMetrics::inc(&self.metrics.frames_dropped);
        }
        delivered
    }

    fn encode<T: Serialize>(&self, event: EventName, payload: &T) -> Option<String> {
        match OutboundFrame::new(event, payload).encode() {
            Ok(frame) => Some(frame),
            Err(e) => {
                error!(event = %event, error = %e, "Failed to serialize outbound frame");
                None
            }
        }
    }

    fn push_all(&self, targets: &[Arc<ConnectionHandle>], frame: &str) -> usize {
        let mut delivered = 0usize;
        for handle in targets {
            if handle.send(frame.to_owned()) {
                delivered += 1;
            }
        }

        HubMetrics::add(&self.metrics.frames_sent, delivered as u64);
        HubMetrics::add(&self.metrics.frames_dropped, (targets.len() - delivered) as u64);
        delivered
    }
}
