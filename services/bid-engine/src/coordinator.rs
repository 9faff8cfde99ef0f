//! Bid coordination
//!
//! Single entry point for bid submission and read paths. The coordinator
//! validates early, writes through the transactional store (the sole
//! source of truth for conflicts), keeps the derived caches honest, and
//! broadcasts accepted changes best-effort.

use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use types::bid::{Bid, HighestBidSnapshot};
use types::errors::{BidError, CloseError, MarketError, StoreError};
use types::events::{BidEventKind, BidUpdateEvent};
use types::ids::{ListingId, WalletAddress};
use types::listing::Listing;
use types::numeric::Amount;

use crate::cache::BidCaches;
use crate::publish::EventPublisher;
use crate::store::BidStore;

/// Page size served to the bid-history read path
const HISTORY_PAGE: usize = 100;

/// Outcome of an accepted submission
#[derive(Debug, Clone)]
pub struct AcceptedBid {
    pub bid: Bid,
    pub kind: BidEventKind,
}

/// Coordinates bid submissions against the store, caches, and broadcast
pub struct BidCoordinator {
    store: Arc<dyn BidStore>,
    publisher: Arc<dyn EventPublisher>,
    caches: Arc<BidCaches>,
}

impl BidCoordinator {
    pub fn new(
        store: Arc<dyn BidStore>,
        publisher: Arc<dyn EventPublisher>,
        caches: Arc<BidCaches>,
    ) -> Self {
        Self {
            store,
            publisher,
            caches,
        }
    }

    /// Submit a bid on a listing
    ///
    /// Pre-checks reject obviously doomed requests without taking the
    /// store's write lock; the store transaction re-validates everything,
    /// so a stale pre-check read can never admit an invalid write.
    pub async fn submit_bid(
        &self,
        listing_id: ListingId,
        bidder: WalletAddress,
        amount: Amount,
    ) -> Result<AcceptedBid, MarketError> {
        let now = Utc::now();

        // Early rejection: listing state
        let listing = self
            .store
            .listing(listing_id, now)
            .map_err(bid_error_from_store)?;
        if !listing.is_biddable(now) {
            return Err(BidError::ListingNotActive {
                status: listing.effective_status(now),
            }
            .into());
        }

        // Early rejection: the bidder's own prior bid
        let prior = self.store.bid(listing_id, &bidder)?;
        if let Some(ref p) = prior {
            if amount <= p.amount {
                return Err(BidError::BidTooLow { minimum: p.amount }.into());
            }
        } else if let Some(snap) = self.caches.snapshots.get(&listing_id, Instant::now()) {
            // Advisory check against the cached highest; the store repeats
            // it authoritatively
            if amount <= snap.amount && snap.bidder != bidder {
                return Err(BidError::BidTooLow {
                    minimum: snap.amount,
                }
                .into());
            }
        }

        // The transaction
        let (bid, kind) = match self.store.upsert_bid(listing_id, &bidder, amount, now) {
            Ok(accepted) => accepted,
            // Pre-check passed but the row moved: a concurrent write from
            // the same bidder won the race
            Err(StoreError::StaleBid) => return Err(BidError::ConcurrentBidConflict.into()),
            Err(err) => return Err(bid_error_from_store(err)),
        };

        self.refresh_snapshot(&bid, kind);
        self.caches.history.invalidate(&listing_id);

        // Best-effort notification; the write already succeeded
        let event = BidUpdateEvent::new(listing_id, kind, amount, bidder, now);
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(%listing_id, %err, "failed to publish bid update");
        }

        Ok(AcceptedBid { bid, kind })
    }

    /// Bid history for display, amount descending
    ///
    /// Cache-aside with TTL; every accepted write invalidates the entry,
    /// so repeated reads between writes are identical.
    pub fn bid_history(&self, listing_id: ListingId) -> Result<Vec<Bid>, MarketError> {
        let now = Instant::now();
        if let Some(bids) = self.caches.history.get(&listing_id, now) {
            return Ok(bids);
        }
        let bids = self.store.bids_by_amount(listing_id, 0, HISTORY_PAGE)?;
        self.caches.history.put(listing_id, bids.clone(), now);
        Ok(bids)
    }

    /// Current highest bid for display (cache-eligible read path)
    pub fn highest_bid(
        &self,
        listing_id: ListingId,
    ) -> Result<Option<HighestBidSnapshot>, MarketError> {
        let now = Instant::now();
        if let Some(snap) = self.caches.snapshots.get(&listing_id, now) {
            return Ok(Some(snap));
        }
        let Some(bid) = self.store.highest_bid(listing_id)? else {
            return Ok(None);
        };
        let snap = HighestBidSnapshot::of(&bid, Utc::now());
        self.caches.snapshots.put(listing_id, snap.clone(), now);
        Ok(Some(snap))
    }

    /// Register a new listing
    pub fn create_listing(&self, listing: Listing) -> Result<Listing, MarketError> {
        Ok(self.store.create_listing(listing)?)
    }

    /// Optimistic snapshot maintenance after an accepted write
    ///
    /// A fresh bid always tops the authoritative highest, so it can be
    /// written into the cache directly. A self-raise may still sit below
    /// the highest; overwrite only when it provably tops the cached value,
    /// invalidate otherwise and let the next read recompute.
    fn refresh_snapshot(&self, bid: &Bid, kind: BidEventKind) {
        let now = Instant::now();
        let listing_id = bid.listing_id;
        match self.caches.snapshots.get(&listing_id, now) {
            Some(snap) if bid.amount >= snap.amount => {
                self.caches
                    .snapshots
                    .put(listing_id, HighestBidSnapshot::of(bid, Utc::now()), now);
            }
            Some(_) => self.caches.snapshots.invalidate(&listing_id),
            None if kind == BidEventKind::New => {
                self.caches
                    .snapshots
                    .put(listing_id, HighestBidSnapshot::of(bid, Utc::now()), now);
            }
            None => self.caches.snapshots.invalidate(&listing_id),
        }
    }
}

fn bid_error_from_store(err: StoreError) -> MarketError {
    match err {
        StoreError::ListingNotFound => BidError::ListingNotFound.into(),
        StoreError::ListingNotActive { status } => BidError::ListingNotActive { status }.into(),
        StoreError::BidTooLow { minimum } => BidError::BidTooLow { minimum }.into(),
        StoreError::StaleBid => BidError::StaleBid.into(),
        other => MarketError::Store(other),
    }
}

pub(crate) fn close_error_from_store(err: StoreError) -> MarketError {
    match err {
        StoreError::ListingNotFound => CloseError::ListingNotFound.into(),
        StoreError::ListingNotActive { status } => CloseError::ListingNotActive { status }.into(),
        other => MarketError::Store(other),
    }
}
