//! Event publishing seam
//!
//! The coordinator and closer publish bid updates through this trait.
//! Publishing is best-effort: a failed publish is logged by the caller and
//! never rolls back the write that triggered it.

use async_trait::async_trait;
use thiserror::Error;
use types::events::BidUpdateEvent;

/// Publish failures, reported but never fatal to the triggering operation
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    #[error("broker unavailable: {0}")]
    Broker(String),

    #[error("event encoding failed: {0}")]
    Encode(String),
}

/// Sink for bid update events
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: BidUpdateEvent) -> Result<(), PublishError>;
}

/// Publisher that drops all events
///
/// Used by tests and by tools that run the engine without a broadcast layer.
pub struct NullPublisher;

#[async_trait]
impl EventPublisher for NullPublisher {
    async fn publish(&self, _event: BidUpdateEvent) -> Result<(), PublishError> {
        Ok(())
    }
}
