use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::bid::Bid;
use types::events::BidEventKind;
use types::ids::{BidId, ListingId, TicketId, WalletAddress};
use types::listing::{Listing, ListingStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingRequest {
    pub ticket_id: TicketId,
    /// Raw decimal; validated into a positive Amount by the handler
    pub asking_price: Decimal,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingResponse {
    pub listing_id: ListingId,
    pub ticket_id: TicketId,
    pub seller: WalletAddress,
    pub asking_price: Decimal,
    pub status: ListingStatus,
    pub expires_at: DateTime<Utc>,
}

impl From<Listing> for ListingResponse {
    fn from(listing: Listing) -> Self {
        Self {
            listing_id: listing.id,
            ticket_id: listing.ticket_id,
            seller: listing.seller,
            asking_price: listing.asking_price.as_decimal(),
            status: listing.status,
            expires_at: listing.expires_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitBidRequest {
    /// Raw decimal; validated into a positive Amount by the handler
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitBidResponse {
    pub bid_id: BidId,
    pub event_type: BidEventKind,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct BidHistoryEntry {
    pub amount: Decimal,
    pub bidder: WalletAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Bid> for BidHistoryEntry {
    fn from(bid: Bid) -> Self {
        Self {
            amount: bid.amount.as_decimal(),
            bidder: bid.bidder,
            created_at: bid.created_at,
            updated_at: bid.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AcceptBidResponse {
    pub transfer_tx: String,
    pub winner: WalletAddress,
    pub amount: Decimal,
}
