//! Bid types
//!
//! A bidder holds at most one standing bid per listing. Subsequent bids
//! from the same bidder replace the amount rather than adding rows.

use crate::ids::{BidId, ListingId, WalletAddress};
use crate::numeric::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bidder's standing offer on a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub listing_id: ListingId,
    pub bidder: WalletAddress,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bid {
    /// Create a fresh bid
    pub fn new(
        listing_id: ListingId,
        bidder: WalletAddress,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BidId::new(),
            listing_id,
            bidder,
            amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the amount on a raise, keeping identity and created_at
    pub fn raise(&mut self, amount: Amount, now: DateTime<Utc>) {
        self.amount = amount;
        self.updated_at = now;
    }
}

/// Cached view of the current highest bid for a listing
///
/// Derived and disposable: rebuildable at any time from the bid store.
/// Never consulted for close decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighestBidSnapshot {
    pub listing_id: ListingId,
    pub amount: Amount,
    pub bidder: WalletAddress,
    pub as_of: DateTime<Utc>,
}

impl HighestBidSnapshot {
    pub fn of(bid: &Bid, as_of: DateTime<Utc>) -> Self {
        Self {
            listing_id: bid.listing_id,
            amount: bid.amount,
            bidder: bid.bidder.clone(),
            as_of,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::from_str_checked(s).unwrap()
    }

    #[test]
    fn test_raise_keeps_identity() {
        let now = Utc::now();
        let mut bid = Bid::new(ListingId::new(), WalletAddress::new("0xA"), amt("0.6"), now);
        let id = bid.id;
        let created = bid.created_at;

        let later = now + chrono::Duration::seconds(30);
        bid.raise(amt("0.7"), later);

        assert_eq!(bid.id, id);
        assert_eq!(bid.created_at, created);
        assert_eq!(bid.updated_at, later);
        assert_eq!(bid.amount, amt("0.7"));
    }

    #[test]
    fn test_snapshot_of_bid() {
        let now = Utc::now();
        let bid = Bid::new(ListingId::new(), WalletAddress::new("0xB"), amt("1.0"), now);
        let snap = HighestBidSnapshot::of(&bid, now);
        assert_eq!(snap.listing_id, bid.listing_id);
        assert_eq!(snap.amount, bid.amount);
        assert_eq!(snap.bidder, bid.bidder);
    }
}
