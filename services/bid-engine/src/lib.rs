//! Bid Coordination Engine
//!
//! Maintains the authoritative current-highest-bid per listing under
//! concurrent writers and closes auctions atomically against an external
//! settlement executor.
//!
//! # Architecture
//!
//! ```text
//!  submit_bid                    accept_highest_bid
//!      │                                │
//! ┌────▼────────┐                ┌──────▼───────┐
//! │ Coordinator │                │ AuctionCloser│
//! └────┬────────┘                └──────┬───────┘
//!      │  transactional write           │ authoritative re-read,
//!      │                                │ settle, finalize
//! ┌────▼────────────────────────────────▼───────┐
//! │                 BidStore                    │
//! └────┬────────────────────────────────────────┘
//!      │ derived views            best-effort events
//! ┌────▼──────┐                ┌──────────────────┐
//! │ BidCaches │                │  EventPublisher  │
//! └───────────┘                └──────────────────┘
//! ```
//!
//! The store is the only transactional boundary; caches are advisory and
//! broadcast is fire-and-forget.

pub mod cache;
pub mod closer;
pub mod coordinator;
pub mod publish;
pub mod settlement;
pub mod store;

pub use cache::{BidCaches, TtlCache, DEFAULT_TTL};
pub use closer::{AuctionCloser, ClosedAuction, DEFAULT_SETTLEMENT_TIMEOUT};
pub use coordinator::{AcceptedBid, BidCoordinator};
pub use publish::{EventPublisher, NullPublisher, PublishError};
pub use settlement::{
    DevExecutor, SettlementError, SettlementExecutor, SettlementIntent, SettlementReceipt,
};
pub use store::{BidStore, MemoryStore};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
