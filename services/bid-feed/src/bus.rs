//! Shared message bus seam
//!
//! Multi-instance deployments publish through a shared broker so every
//! instance can relay updates to its locally-connected subscribers. The
//! trait stands for that broker; `InMemoryBus` implements it for
//! single-process deployments and tests.

use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;

/// A message delivered from the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: String,
}

/// Bus failures
#[derive(Debug, Clone, Error)]
pub enum BusError {
    #[error("bus connection closed")]
    Closed,

    #[error("payload encoding failed: {0}")]
    Encode(String),
}

/// Publish/subscribe broker shared by all marketplace instances
///
/// Delivery is at-least-once with no cross-publisher ordering guarantee;
/// consumers reconcile against authoritative reads.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Publish a payload to a topic
    async fn publish(&self, topic: &str, payload: String) -> Result<(), BusError>;

    /// Subscribe to every topic matching a pattern (`prefix*` wildcards)
    async fn subscribe(&self, pattern: &str) -> Result<mpsc::Receiver<BusMessage>, BusError>;
}

/// Does `topic` match `pattern`? Only a trailing `*` wildcard is supported.
fn topic_matches(pattern: &str, topic: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => topic.starts_with(prefix),
        None => pattern == topic,
    }
}

struct Subscription {
    pattern: String,
    sender: mpsc::Sender<BusMessage>,
}

/// In-process bus for single-instance deployments and tests
pub struct InMemoryBus {
    subscriptions: Mutex<Vec<Subscription>>,
    capacity: usize,
}

impl InMemoryBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            capacity,
        }
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn publish(&self, topic: &str, payload: String) -> Result<(), BusError> {
        let mut subs = self.subscriptions.lock().expect("bus mutex poisoned");
        // Drop subscriptions whose receiver has gone away
        subs.retain(|sub| !sub.sender.is_closed());
        for sub in subs.iter() {
            if topic_matches(&sub.pattern, topic) {
                let message = BusMessage {
                    topic: topic.to_string(),
                    payload: payload.clone(),
                };
                // A full subscriber loses this message; it reconciles on
                // its next authoritative read
                if let Err(err) = sub.sender.try_send(message) {
                    tracing::warn!(topic, %err, "dropping bus message for slow subscriber");
                }
            }
        }
        Ok(())
    }

    async fn subscribe(&self, pattern: &str) -> Result<mpsc::Receiver<BusMessage>, BusError> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.subscriptions
            .lock()
            .expect("bus mutex poisoned")
            .push(Subscription {
                pattern: pattern.to_string(),
                sender: tx,
            });
        Ok(rx)
    }
}
