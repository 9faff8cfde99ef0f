//! Error taxonomy for the bid engine
//!
//! Every error crossing a module boundary is a variant of a closed enum so
//! calling layers can map them to user-facing responses exhaustively.

use crate::listing::ListingStatus;
use crate::numeric::Amount;
use thiserror::Error;

/// Top-level marketplace error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketError {
    #[error("Bid error: {0}")]
    Bid(#[from] BidError),

    #[error("Close error: {0}")]
    Close(#[from] CloseError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Bid submission errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BidError {
    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("Listing not found")]
    ListingNotFound,

    #[error("Listing is not active: {status}")]
    ListingNotActive { status: ListingStatus },

    /// Rejection includes the minimum acceptable amount so the client can
    /// retry with a corrected value immediately.
    #[error("Bid too low: minimum acceptable amount is {minimum}")]
    BidTooLow { minimum: Amount },

    /// The bidder's stored amount already meets or exceeds the request
    #[error("Stale bid: stored amount is not lower than the request")]
    StaleBid,

    /// A concurrent write won; re-fetch the current highest and resubmit
    #[error("Concurrent bid conflict, retry with a fresh read")]
    ConcurrentBidConflict,
}

/// Auction close errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CloseError {
    #[error("Only the seller may accept bids")]
    Unauthorized,

    #[error("Listing is not active: {status}")]
    ListingNotActive { status: ListingStatus },

    #[error("Listing not found")]
    ListingNotFound,

    #[error("No bids on listing")]
    NoBids,

    /// Settlement rejected or failed on-chain; no state was changed
    #[error("Settlement failed: {reason}")]
    SettlementFailed { reason: String },

    /// Settlement did not complete within the deadline; no state was
    /// changed, but the executor may still be working. Retry only after
    /// confirming non-execution.
    #[error("Settlement timed out after {seconds}s")]
    SettlementTimedOut { seconds: u64 },
}

/// Storage-layer errors, surfaced as typed variants rather than raw
/// backend failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Listing not found")]
    ListingNotFound,

    #[error("Listing is not active: {status}")]
    ListingNotActive { status: ListingStatus },

    #[error("Bid too low: minimum acceptable amount is {minimum}")]
    BidTooLow { minimum: Amount },

    #[error("Stale bid")]
    StaleBid,

    #[error("Ticket not found: {ticket_id}")]
    TicketNotFound { ticket_id: u64 },

    #[error("Ticket {ticket_id} already has an active listing")]
    DuplicateActiveListing { ticket_id: u64 },
}

impl MarketError {
    /// Whether the caller may retry the same request after a fresh read
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            MarketError::Bid(BidError::BidTooLow { .. })
                | MarketError::Bid(BidError::StaleBid)
                | MarketError::Bid(BidError::ConcurrentBidConflict)
        )
    }
}
