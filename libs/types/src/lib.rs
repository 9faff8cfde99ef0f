//! Types library for the ticket marketplace bid engine
//!
//! This library provides all core type definitions shared across the
//! marketplace services, ensuring type safety and deterministic behavior.
//!
//! # Modules
//! - `ids`: Unique identifiers (ListingId, BidId, TicketId, WalletAddress)
//! - `numeric`: Fixed-point decimal amounts
//! - `listing`: Listing lifecycle types
//! - `bid`: Bid and highest-bid snapshot types
//! - `events`: Broadcast event types
//! - `errors`: Error taxonomy

// Public modules
pub mod bid;
pub mod errors;
pub mod events;
pub mod ids;
pub mod listing;
pub mod numeric;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bid::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::ids::*;
    pub use crate::listing::*;
    pub use crate::numeric::*;
}
