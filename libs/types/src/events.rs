//! Bid update events broadcast to subscribers
//!
//! Ephemeral wire entities: transmitted over the fan-out layer, never
//! persisted. Consumers treat the stream as convergent and reconcile
//! against an authoritative re-read after reconnects.

use crate::ids::{ListingId, WalletAddress};
use crate::numeric::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What kind of change the event reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BidEventKind {
    /// First bid from this bidder on the listing
    New,
    /// A bidder raised their standing bid
    Updated,
    /// The listing closed; `amount`/`bidder` identify the winner
    Closed,
}

/// Notification of a bid change on a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidUpdateEvent {
    pub listing_id: ListingId,
    pub kind: BidEventKind,
    pub amount: Amount,
    pub bidder: WalletAddress,
    pub timestamp: DateTime<Utc>,
}

impl BidUpdateEvent {
    pub fn new(
        listing_id: ListingId,
        kind: BidEventKind,
        amount: Amount,
        bidder: WalletAddress,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            listing_id,
            kind,
            amount,
            bidder,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&BidEventKind::Updated).unwrap(),
            "\"UPDATED\""
        );
    }

    #[test]
    fn test_event_roundtrip() {
        let ev = BidUpdateEvent::new(
            ListingId::new(),
            BidEventKind::New,
            Amount::from_str_checked("0.65").unwrap(),
            WalletAddress::new("0xBidder"),
            Utc::now(),
        );
        let json = serde_json::to_string(&ev).unwrap();
        let back: BidUpdateEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
