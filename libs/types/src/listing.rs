//! Listing lifecycle types
//!
//! A listing offers a ticket for sale at an asking price and accepts
//! competing bids while Active. Closed, Cancelled and Expired are terminal.

use crate::ids::{ListingId, TicketId, WalletAddress};
use crate::numeric::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing status
///
/// Transitions: Active → Closed (highest bid accepted), Active → Cancelled
/// (seller action), Active → Expired (expiration reached, observed lazily
/// on access). Terminal states admit no further transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ListingStatus {
    Active,
    Closed,
    Cancelled,
    Expired,
}

impl ListingStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ListingStatus::Active)
    }
}

impl std::fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ListingStatus::Active => "ACTIVE",
            ListingStatus::Closed => "CLOSED",
            ListingStatus::Cancelled => "CANCELLED",
            ListingStatus::Expired => "EXPIRED",
        };
        write!(f, "{}", s)
    }
}

/// A ticket offered for sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    /// Token reference; at most one Active listing per ticket at any time
    pub ticket_id: TicketId,
    pub seller: WalletAddress,
    pub asking_price: Amount,
    /// Bids are rejected once this instant has passed
    pub expires_at: DateTime<Utc>,
    pub status: ListingStatus,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// Create a new Active listing
    pub fn new(
        ticket_id: TicketId,
        seller: WalletAddress,
        asking_price: Amount,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ListingId::new(),
            ticket_id,
            seller,
            asking_price,
            expires_at,
            status: ListingStatus::Active,
            created_at: now,
        }
    }

    /// Whether the listing accepts bids at `now`
    ///
    /// Active status alone is not enough: an Active listing past its
    /// expiration is already Expired, it just has not been observed yet.
    pub fn is_biddable(&self, now: DateTime<Utc>) -> bool {
        self.status == ListingStatus::Active && now < self.expires_at
    }

    /// Status as observed at `now`, applying lazy expiration
    pub fn effective_status(&self, now: DateTime<Utc>) -> ListingStatus {
        if self.status == ListingStatus::Active && now >= self.expires_at {
            ListingStatus::Expired
        } else {
            self.status
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn listing(now: DateTime<Utc>) -> Listing {
        Listing::new(
            TicketId::new(7),
            WalletAddress::new("0xSeller"),
            Amount::from_str_checked("0.5").unwrap(),
            now + Duration::hours(1),
            now,
        )
    }

    #[test]
    fn test_new_listing_is_active() {
        let now = Utc::now();
        let l = listing(now);
        assert_eq!(l.status, ListingStatus::Active);
        assert!(l.is_biddable(now));
    }

    #[test]
    fn test_lazy_expiration() {
        let now = Utc::now();
        let l = listing(now);
        let later = now + Duration::hours(2);
        assert!(!l.is_biddable(later));
        assert_eq!(l.effective_status(later), ListingStatus::Expired);
        // Stored status untouched until the store persists the transition
        assert_eq!(l.status, ListingStatus::Active);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!ListingStatus::Active.is_terminal());
        assert!(ListingStatus::Closed.is_terminal());
        assert!(ListingStatus::Cancelled.is_terminal());
        assert!(ListingStatus::Expired.is_terminal());
    }

    #[test]
    fn test_closed_listing_not_biddable() {
        let now = Utc::now();
        let mut l = listing(now);
        l.status = ListingStatus::Closed;
        assert!(!l.is_biddable(now));
        assert_eq!(l.effective_status(now), ListingStatus::Closed);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ListingStatus::Cancelled).unwrap();
        assert_eq!(json, "\"CANCELLED\"");
    }
}
