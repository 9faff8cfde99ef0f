//! Durable bid and listing storage
//!
//! The store is the transactional boundary of the system: every mutating
//! operation re-validates listing state inside the same transaction as the
//! write, so no check-then-act race is possible across callers or across
//! server instances sharing one store. Cross-bidder ordering is delegated
//! entirely to it; the coordinator's pre-checks are early rejections only.

mod memory;

pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use types::bid::Bid;
use types::errors::StoreError;
use types::events::BidEventKind;
use types::ids::{ListingId, TicketId, WalletAddress};
use types::listing::Listing;
use types::numeric::Amount;

/// Transactional keyed storage of listings, bids, and ticket ownership
///
/// Invariants enforced by implementations:
/// - at most one bid row per (listing, bidder); raises mutate in place
/// - at most one Active listing per ticket
/// - a bid write observes the listing status decided in the same
///   transaction (lazy expiry included)
pub trait BidStore: Send + Sync {
    /// Register a new listing; rejects a second Active listing for the
    /// same ticket and records the seller as ticket owner if unknown
    fn create_listing(&self, listing: Listing) -> Result<Listing, StoreError>;

    /// Read a listing, persisting the Expired transition if its
    /// expiration has passed
    fn listing(&self, id: ListingId, now: DateTime<Utc>) -> Result<Listing, StoreError>;

    /// Read a bidder's standing bid, if any
    fn bid(&self, listing: ListingId, bidder: &WalletAddress) -> Result<Option<Bid>, StoreError>;

    /// Insert or raise a bid in one transaction
    ///
    /// Validation, all under the same lock as the write:
    /// - listing must be Active and unexpired
    /// - a raise must strictly exceed the bidder's own prior amount
    ///   (`StaleBid` otherwise)
    /// - a new bidder must offer at least the asking price and strictly
    ///   more than the current highest bid (`BidTooLow` carries the
    ///   minimum acceptable amount)
    fn upsert_bid(
        &self,
        listing: ListingId,
        bidder: &WalletAddress,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<(Bid, BidEventKind), StoreError>;

    /// Authoritative highest bid, bypassing every cache
    ///
    /// Ties on amount break toward the earliest `created_at`: the first
    /// bidder at a price has priority.
    fn highest_bid(&self, listing: ListingId) -> Result<Option<Bid>, StoreError>;

    /// Bids ordered by amount descending, paginated and restartable
    fn bids_by_amount(
        &self,
        listing: ListingId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Bid>, StoreError>;

    /// Remove every bid on a listing, returning the count removed
    fn delete_all_bids(&self, listing: ListingId) -> Result<usize, StoreError>;

    /// Close out a settled auction in one transaction: mark the listing
    /// Closed, transfer ticket ownership to the winner, delete all bids.
    /// Fails without side effects if the listing is no longer Active.
    fn finalize_close(
        &self,
        listing: ListingId,
        winner: &Bid,
        now: DateTime<Utc>,
    ) -> Result<Listing, StoreError>;

    /// Seller-initiated Active → Cancelled transition
    fn cancel_listing(&self, listing: ListingId, now: DateTime<Utc>) -> Result<Listing, StoreError>;

    /// Current owner of a ticket
    fn ticket_owner(&self, ticket: TicketId) -> Result<WalletAddress, StoreError>;
}
