//! Auction closing and seller cancellation
//!
//! Accepting the highest bid crosses an external settlement boundary, so
//! the close path is deliberately pessimistic: re-read everything from the
//! durable store (never the cache), settle with a deadline, and only then
//! commit the Closed transition, ownership transfer, and bid cleanup as a
//! single store transaction. Settlement failure or timeout leaves every
//! persisted row exactly as it was.
//!
//! Seller cancellation goes through the same per-listing lock as closing.
//! A cancel that lands between the settlement call and the close commit
//! would leave the chain and the store disagreeing about ownership, so a
//! cancel issued while a close is in flight waits for it to resolve and
//! then fails against the Closed listing.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use types::bid::Bid;
use types::errors::{CloseError, MarketError};
use types::events::{BidEventKind, BidUpdateEvent};
use types::ids::{ListingId, WalletAddress};
use types::listing::{Listing, ListingStatus};

use crate::cache::BidCaches;
use crate::coordinator::close_error_from_store;
use crate::publish::EventPublisher;
use crate::settlement::{SettlementExecutor, SettlementIntent, SettlementReceipt};
use crate::store::BidStore;

/// Default deadline for the settlement call; on-chain confirmation can be
/// slow under congestion
pub const DEFAULT_SETTLEMENT_TIMEOUT: Duration = Duration::from_secs(45);

/// Per-listing lifecycle locks with release-time pruning
///
/// Entries are created on demand and removed once the last holder lets
/// go, so failed attempts against arbitrary listing ids do not accumulate
/// map entries.
#[derive(Default)]
struct ListingLocks {
    locks: DashMap<ListingId, Arc<Mutex<()>>>,
}

impl ListingLocks {
    fn acquire(&self, listing_id: ListingId) -> Arc<Mutex<()>> {
        self.locks
            .entry(listing_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the entry unless another task still holds or awaits the lock
    fn prune(&self, listing_id: &ListingId) {
        self.locks
            .remove_if(listing_id, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.len()
    }
}

/// Result of a successful close
#[derive(Debug, Clone)]
pub struct ClosedAuction {
    pub listing: Listing,
    pub winner: Bid,
    pub receipt: SettlementReceipt,
}

/// Closes auctions by settling the authoritative highest bid
pub struct AuctionCloser {
    store: Arc<dyn BidStore>,
    executor: Arc<dyn SettlementExecutor>,
    publisher: Arc<dyn EventPublisher>,
    caches: Arc<BidCaches>,
    settlement_timeout: Duration,
    /// Serializes close and cancel attempts per listing; bids keep
    /// flowing through the store while a close is in flight
    close_locks: ListingLocks,
}

impl AuctionCloser {
    pub fn new(
        store: Arc<dyn BidStore>,
        executor: Arc<dyn SettlementExecutor>,
        publisher: Arc<dyn EventPublisher>,
        caches: Arc<BidCaches>,
        settlement_timeout: Duration,
    ) -> Self {
        Self {
            store,
            executor,
            publisher,
            caches,
            settlement_timeout,
            close_locks: ListingLocks::default(),
        }
    }

    /// Accept the current highest bid on a listing
    ///
    /// Only the seller may close. The highest bid is re-read from the
    /// store after taking the per-listing close lock, so the settled bid
    /// is the authoritative highest at decision time.
    pub async fn accept_highest_bid(
        &self,
        listing_id: ListingId,
        requester: &WalletAddress,
    ) -> Result<ClosedAuction, MarketError> {
        let lock = self.close_locks.acquire(listing_id);
        let guard = lock.lock().await;
        let result = self.close_under_lock(listing_id, requester).await;
        drop(guard);
        drop(lock);
        self.close_locks.prune(&listing_id);
        result
    }

    /// Cancel an Active listing and void its standing bids
    ///
    /// Serialized with closes on the same per-listing lock: a cancel
    /// arriving mid-settlement waits and then fails `ListingNotActive`
    /// instead of stranding an executed ownership transfer.
    pub async fn cancel_listing(
        &self,
        listing_id: ListingId,
        requester: &WalletAddress,
    ) -> Result<Listing, MarketError> {
        let lock = self.close_locks.acquire(listing_id);
        let guard = lock.lock().await;
        let result = self.cancel_under_lock(listing_id, requester);
        drop(guard);
        drop(lock);
        self.close_locks.prune(&listing_id);
        result
    }

    async fn close_under_lock(
        &self,
        listing_id: ListingId,
        requester: &WalletAddress,
    ) -> Result<ClosedAuction, MarketError> {
        let now = Utc::now();
        let listing = self
            .store
            .listing(listing_id, now)
            .map_err(close_error_from_store)?;

        if listing.seller != *requester {
            return Err(CloseError::Unauthorized.into());
        }
        let status = listing.effective_status(now);
        if status != ListingStatus::Active {
            return Err(CloseError::ListingNotActive { status }.into());
        }

        let winner = self
            .store
            .highest_bid(listing_id)?
            .ok_or(CloseError::NoBids)?;

        let intent = SettlementIntent::new();
        tracing::info!(
            %listing_id,
            ticket = %listing.ticket_id,
            buyer = %winner.bidder,
            amount = %winner.amount,
            %intent,
            "settling auction close"
        );

        let settlement = self.executor.execute(
            listing.ticket_id,
            winner.bidder.clone(),
            winner.amount,
            intent,
        );
        let receipt = match tokio::time::timeout(self.settlement_timeout, settlement).await {
            Err(_) => {
                tracing::warn!(%listing_id, %intent, "settlement timed out");
                return Err(CloseError::SettlementTimedOut {
                    seconds: self.settlement_timeout.as_secs(),
                }
                .into());
            }
            Ok(Err(err)) => {
                tracing::warn!(%listing_id, %intent, %err, "settlement failed");
                return Err(CloseError::SettlementFailed {
                    reason: err.to_string(),
                }
                .into());
            }
            Ok(Ok(receipt)) => receipt,
        };

        // Settlement is final; commit the close as one transaction
        let closed = self
            .store
            .finalize_close(listing_id, &winner, Utc::now())
            .map_err(close_error_from_store)?;
        self.caches.invalidate_listing(&listing_id);

        let event = BidUpdateEvent::new(
            listing_id,
            BidEventKind::Closed,
            winner.amount,
            winner.bidder.clone(),
            Utc::now(),
        );
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(%listing_id, %err, "failed to publish close event");
        }

        Ok(ClosedAuction {
            listing: closed,
            winner,
            receipt,
        })
    }

    fn cancel_under_lock(
        &self,
        listing_id: ListingId,
        requester: &WalletAddress,
    ) -> Result<Listing, MarketError> {
        let now = Utc::now();
        let listing = self
            .store
            .listing(listing_id, now)
            .map_err(close_error_from_store)?;
        if listing.seller != *requester {
            return Err(CloseError::Unauthorized.into());
        }

        let cancelled = self
            .store
            .cancel_listing(listing_id, now)
            .map_err(close_error_from_store)?;

        // Cancelled listings reject new bids at the store, so the
        // leftover rows are dead weight rather than a consistency hazard
        let removed = self.store.delete_all_bids(listing_id)?;
        self.caches.invalidate_listing(&listing_id);
        tracing::info!(%listing_id, removed, "listing cancelled");

        Ok(cancelled)
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.close_locks.len()
    }
}
