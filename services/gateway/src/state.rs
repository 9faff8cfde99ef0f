use crate::config::GatewayConfig;
use crate::rate_limit::RateLimiter;
use async_trait::async_trait;
use bid_engine::publish::{EventPublisher, PublishError};
use bid_engine::{AuctionCloser, BidCoordinator};
use bid_feed::BidFeed;
use std::sync::Arc;
use types::events::BidUpdateEvent;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<BidCoordinator>,
    pub closer: Arc<AuctionCloser>,
    pub feed: Arc<BidFeed>,
    pub rate_limiter: Arc<RateLimiter>,
    pub config: Arc<GatewayConfig>,
}

/// Adapts the fan-out feed to the engine's publisher seam
pub struct FeedPublisher(pub Arc<BidFeed>);

#[async_trait]
impl EventPublisher for FeedPublisher {
    async fn publish(&self, event: BidUpdateEvent) -> Result<(), PublishError> {
        self.0
            .publish(&event)
            .await
            .map_err(|err| PublishError::Broker(err.to_string()))
    }
}
