//! Topic naming for bid update channels
//!
//! Channels are strings on the wire (`bids@<listing-uuid>`) so the broker
//! and WebSocket subscription protocol share one format.

use types::ids::ListingId;

/// Pattern matching every bid topic, for instance-wide relay subscriptions
pub const BIDS_PATTERN: &str = "bids@*";

/// Channels available for subscription
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Bid updates for one listing: `bids@{listing_id}`
    Bids { listing_id: ListingId },
}

impl Channel {
    /// Parse a channel string
    pub fn parse(s: &str) -> Option<Self> {
        let listing = s.strip_prefix("bids@")?;
        let listing_id: ListingId = listing.parse().ok()?;
        Some(Channel::Bids { listing_id })
    }

    /// Serialize as channel string
    pub fn to_channel_string(&self) -> String {
        match self {
            Channel::Bids { listing_id } => format!("bids@{}", listing_id),
        }
    }

    pub fn listing_id(&self) -> ListingId {
        match self {
            Channel::Bids { listing_id } => *listing_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let listing_id = ListingId::new();
        let ch = Channel::Bids { listing_id };
        let s = ch.to_channel_string();
        assert_eq!(Channel::parse(&s), Some(ch));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Channel::parse("bids@not-a-uuid"), None);
        assert_eq!(Channel::parse("trades@whatever"), None);
        assert_eq!(Channel::parse(""), None);
    }
}
