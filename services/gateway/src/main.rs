mod auth;
mod config;
mod error;
mod handlers;
mod models;
mod rate_limit;
mod router;
mod state;

use crate::config::GatewayConfig;
use crate::rate_limit::RateLimiter;
use crate::state::{AppState, FeedPublisher};
use anyhow::Context;
use bid_engine::cache::BidCaches;
use bid_engine::settlement::DevExecutor;
use bid_engine::store::MemoryStore;
use bid_engine::{AuctionCloser, BidCoordinator};
use bid_feed::{BidFeed, InMemoryBus, MessageBus};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway=info,bid_engine=info,bid_feed=info".into()),
        )
        .init();

    let config = Arc::new(GatewayConfig::from_env());
    info!(bind = %config.bind_addr, "starting bid gateway");

    // Single-node broker; a Redis-backed bus slots in behind the same trait
    let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::new(1024));
    let feed = Arc::new(
        BidFeed::connect(Arc::clone(&bus))
            .await
            .context("attach bid feed to bus")?,
    );

    let store = Arc::new(MemoryStore::new());
    let caches = Arc::new(BidCaches::new(config.cache_ttl));
    let publisher = Arc::new(FeedPublisher(Arc::clone(&feed)));

    let coordinator = Arc::new(BidCoordinator::new(
        store.clone(),
        publisher.clone(),
        caches.clone(),
    ));
    let closer = Arc::new(AuctionCloser::new(
        store,
        Arc::new(DevExecutor),
        publisher,
        caches,
        config.settlement_timeout,
    ));

    let state = AppState {
        coordinator,
        closer,
        feed,
        rate_limiter: Arc::new(RateLimiter::new()),
        config: config.clone(),
    };

    let app = router::build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .context("bind gateway listener")?;
    info!(addr = %config.bind_addr, "gateway listening");
    axum::serve(listener, app).await.context("serve gateway")?;

    Ok(())
}
