//! Broadcast fan-out for bid updates
//!
//! Delivers `BidUpdateEvent`s to every subscriber of a listing across all
//! marketplace instances: publishes go through a shared [`bus::MessageBus`]
//! and each instance's [`fanout::BidFeed`] relays broker messages into
//! per-listing rooms for its locally-connected clients.
//!
//! The fan-out owns no state worth persisting; it is a stateless relay
//! with at-least-once delivery, and consumers reconcile against the
//! authoritative store after reconnects.

pub mod bus;
pub mod fanout;
pub mod topic;

pub use bus::{BusError, BusMessage, InMemoryBus, MessageBus};
pub use fanout::BidFeed;
pub use topic::{Channel, BIDS_PATTERN};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
