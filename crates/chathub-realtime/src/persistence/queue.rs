//! Persistence queue — stores messages on a background worker.
//!
//! The hub hands messages over with a non-blocking `enqueue`; the worker
//! calls the [`MessageStore`] and only logs and counts failures. With
//! `max_retries = 0` every message is attempted at most once.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use chathub_core::config::PersistenceConfig;
use chathub_core::traits::MessageStore;
use chathub_core::types::message::NewMessage;

use crate::metrics::HubMetrics;

/// Retry policy for the worker.
#[derive(Debug, Clone, Copy)]
struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
}

/// Bounded queue in front of a message store.
pub struct MessagePersistor {
    /// Queue sender
    sender: mpsc::Sender<NewMessage>,
    /// Shutdown signal for the worker
    shutdown_tx: watch::Sender<bool>,
    /// Worker task, taken on shutdown
    worker: Mutex<Option<JoinHandle<()>>>,
    /// Store backend name, for logs
    backend: &'static str,
    /// Shared metrics
    metrics: Arc<HubMetrics>,
}

impl std::fmt::Debug for MessagePersistor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagePersistor")
            .field("backend", &self.backend)
            .finish()
    }
}

impl MessagePersistor {
    /// Start the persistence worker. Must be called inside a Tokio runtime.
    pub fn start(
        store: Arc<dyn MessageStore>,
        config: &PersistenceConfig,
        metrics: Arc<HubMetrics>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let backend = store.backend_name();
        let policy = RetryPolicy {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        };

        let worker = tokio::spawn(run_worker(
            store,
            receiver,
            shutdown_rx,
            policy,
            metrics.clone(),
        ));

        info!(
            backend,
            queue_capacity = config.queue_capacity,
            max_retries = config.max_retries,
            "Message persistor started"
        );

        Self {
            sender,
            shutdown_tx,
            worker: Mutex::new(Some(worker)),
            backend,
            metrics,
        }
    }

    /// Queue a message for storage without waiting.
    ///
    /// Returns `false` if the queue is full or shut down; the message is
    /// dropped and logged.
    pub fn enqueue(&self, message: NewMessage) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(message)) => {
                HubMetrics::inc(&self.metrics.persist_dropped);
                error!(
                    chat_id = %message.chat_id,
                    sender_id = %message.sender_id,
                    "Persistence queue full, dropping message"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(message)) => {
                HubMetrics::inc(&self.metrics.persist_dropped);
                error!(
                    chat_id = %message.chat_id,
                    sender_id = %message.sender_id,
                    "Persistence queue closed, dropping message"
                );
                false
            }
        }
    }

    /// Store backend name
    pub fn backend(&self) -> &'static str {
        self.backend
    }

    /// Stop accepting messages, store what is already queued, and wait for
    /// the worker to finish. Idempotent.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!(error = %e, "Persistence worker terminated abnormally");
            }
            info!(backend = self.backend, "Message persistor stopped");
        }
    }
}

async fn run_worker(
    store: Arc<dyn MessageStore>,
    mut receiver: mpsc::Receiver<NewMessage>,
    mut shutdown_rx: watch::Receiver<bool>,
    policy: RetryPolicy,
    metrics: Arc<HubMetrics>,
) {
    loop {
        tokio::select! {
            maybe = receiver.recv() => match maybe {
                Some(message) => persist_with_retry(store.as_ref(), message, policy, &metrics).await,
                None => break,
            },
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }

    receiver.close();
    while let Some(message) = receiver.recv().await {
        persist_with_retry(store.as_ref(), message, policy, &metrics).await;
    }
    debug!("Persistence worker drained");
}

async fn persist_with_retry(
    store: &dyn MessageStore,
    message: NewMessage,
    policy: RetryPolicy,
    metrics: &HubMetrics,
) {
    let mut attempt = 0u32;
    loop {
        match store.persist(message.clone()).await {
            Ok(record) => {
                HubMetrics::inc(&metrics.persist_succeeded);
                debug!(
                    message_id = %record.id,
                    chat_id = %record.chat_id,
                    attempt,
                    "Message persisted"
                );
                return;
            }
            Err(e) if attempt < policy.max_retries => {
                attempt += 1;
                warn!(
                    chat_id = %message.chat_id,
                    attempt,
                    error = %e,
                    "Message persistence failed, retrying"
                );
                tokio::time::sleep(policy.backoff).await;
            }
            Err(e) => {
                HubMetrics::inc(&metrics.persist_failed);
                error!(
                    chat_id = %message.chat_id,
                    sender_id = %message.sender_id,
                    backend = store.backend_name(),
                    error = %e,
                    "Message persistence failed"
                );
                return;
            }
        }
    }
}
