//! Unique identifier types for marketplace entities
//!
//! Listing and bid IDs use UUID v7 for time-sortable ordering, enabling
//! efficient chronological queries. Ticket IDs mirror the on-chain token id.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a listing
///
/// Uses UUID v7 for time-based sorting. Listings can be efficiently
/// queried in chronological order using the embedded timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(Uuid);

impl ListingId {
    /// Create a new ListingId with current timestamp
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create from existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get inner UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ListingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ListingId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a bid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BidId(Uuid);

impl BidId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for BidId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NFT token id of a ticket
///
/// Assigned by the ticket contract at mint time; the marketplace treats it
/// as an opaque unique reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(u64);

impl TicketId {
    pub fn new(token_id: u64) -> Self {
        Self(token_id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wallet address identifying a bidder or seller
///
/// Hex addresses compare case-insensitively, so the address is normalized
/// to lowercase on construction. Equality and hashing use the normalized
/// form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create a wallet address, normalizing case
    pub fn new(address: impl AsRef<str>) -> Self {
        Self(address.as_ref().trim().to_ascii_lowercase())
    }

    /// Get the normalized address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_id_creation() {
        let id1 = ListingId::new();
        let id2 = ListingId::new();
        assert_ne!(id1, id2, "ListingIds should be unique");
    }

    #[test]
    fn test_listing_id_serialization() {
        let id = ListingId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: ListingId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_listing_id_parse_roundtrip() {
        let id = ListingId::new();
        let parsed: ListingId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_bid_id_creation() {
        let id1 = BidId::new();
        let id2 = BidId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_ticket_id() {
        let ticket = TicketId::new(42);
        assert_eq!(ticket.as_u64(), 42);
        assert_eq!(ticket.to_string(), "42");
    }

    #[test]
    fn test_wallet_address_case_insensitive() {
        let a = WalletAddress::new("0xAbC123DEF");
        let b = WalletAddress::new("0xabc123def");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0xabc123def");
    }

    #[test]
    fn test_wallet_address_trims_whitespace() {
        let a = WalletAddress::new("  0xABC  ");
        assert_eq!(a.as_str(), "0xabc");
    }

    #[test]
    fn test_wallet_address_serialization() {
        let addr = WalletAddress::new("0xFeedFace");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0xfeedface\"");
    }
}
