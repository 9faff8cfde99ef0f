//! In-memory transactional store
//!
//! A single mutex over listings, bids, and ticket ownership forms the
//! transactional boundary: conflicting writers are serialized, and every
//! mutating operation sees listing status and competing bids at the moment
//! of the write. Critical sections are short and never held across awaits.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use types::bid::Bid;
use types::errors::StoreError;
use types::events::BidEventKind;
use types::ids::{ListingId, TicketId, WalletAddress};
use types::listing::{Listing, ListingStatus};
use types::numeric::Amount;

use super::BidStore;

#[derive(Default)]
struct Inner {
    listings: HashMap<ListingId, Listing>,
    /// Bid rows keyed (listing, bidder); the nested map enforces the
    /// one-bid-per-bidder invariant structurally
    bids: HashMap<ListingId, HashMap<WalletAddress, Bid>>,
    /// Ticket ownership records, rewritten on auction close
    tickets: HashMap<TicketId, WalletAddress>,
}

/// In-memory implementation of [`BidStore`]
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("store mutex poisoned")
    }
}

/// Pick the better of two bids: higher amount wins, equal amounts go to
/// the earlier `created_at`, with bidder address as a final deterministic
/// tie-break.
fn better<'a>(a: &'a Bid, b: &'a Bid) -> &'a Bid {
    match a.amount.cmp(&b.amount) {
        std::cmp::Ordering::Greater => a,
        std::cmp::Ordering::Less => b,
        std::cmp::Ordering::Equal => match a.created_at.cmp(&b.created_at) {
            std::cmp::Ordering::Less => a,
            std::cmp::Ordering::Greater => b,
            std::cmp::Ordering::Equal => {
                if a.bidder <= b.bidder {
                    a
                } else {
                    b
                }
            }
        },
    }
}

fn highest_of(bids: &HashMap<WalletAddress, Bid>) -> Option<&Bid> {
    bids.values().reduce(|best, bid| better(best, bid))
}

/// Apply lazy expiry to a listing in place, returning its current status
fn settle_expiry(listing: &mut Listing, now: DateTime<Utc>) -> ListingStatus {
    if listing.status == ListingStatus::Active && now >= listing.expires_at {
        listing.status = ListingStatus::Expired;
    }
    listing.status
}

impl BidStore for MemoryStore {
    fn create_listing(&self, listing: Listing) -> Result<Listing, StoreError> {
        let mut g = self.locked();
        let duplicate = g
            .listings
            .values()
            .any(|l| l.ticket_id == listing.ticket_id && l.status == ListingStatus::Active);
        if duplicate {
            return Err(StoreError::DuplicateActiveListing {
                ticket_id: listing.ticket_id.as_u64(),
            });
        }
        g.tickets
            .entry(listing.ticket_id)
            .or_insert_with(|| listing.seller.clone());
        g.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    fn listing(&self, id: ListingId, now: DateTime<Utc>) -> Result<Listing, StoreError> {
        let mut g = self.locked();
        let listing = g.listings.get_mut(&id).ok_or(StoreError::ListingNotFound)?;
        settle_expiry(listing, now);
        Ok(listing.clone())
    }

    fn bid(&self, listing: ListingId, bidder: &WalletAddress) -> Result<Option<Bid>, StoreError> {
        let g = self.locked();
        Ok(g.bids
            .get(&listing)
            .and_then(|bids| bids.get(bidder))
            .cloned())
    }

    fn upsert_bid(
        &self,
        listing: ListingId,
        bidder: &WalletAddress,
        amount: Amount,
        now: DateTime<Utc>,
    ) -> Result<(Bid, BidEventKind), StoreError> {
        let mut g = self.locked();

        // Listing status decided under the same lock as the write
        let record = g
            .listings
            .get_mut(&listing)
            .ok_or(StoreError::ListingNotFound)?;
        let status = settle_expiry(record, now);
        if status != ListingStatus::Active {
            return Err(StoreError::ListingNotActive { status });
        }
        let asking_price = record.asking_price;

        let bids = g.bids.entry(listing).or_default();

        if let Some(existing) = bids.get_mut(bidder) {
            // Raise: compare-and-swap against the bidder's own prior amount
            if amount <= existing.amount {
                return Err(StoreError::StaleBid);
            }
            existing.raise(amount, now);
            return Ok((existing.clone(), BidEventKind::Updated));
        }

        // New bidder: meet the asking price and beat the current highest
        if amount < asking_price {
            return Err(StoreError::BidTooLow {
                minimum: asking_price,
            });
        }
        if let Some(top) = highest_of(bids) {
            if amount <= top.amount {
                return Err(StoreError::BidTooLow {
                    minimum: top.amount,
                });
            }
        }

        let bid = Bid::new(listing, bidder.clone(), amount, now);
        bids.insert(bidder.clone(), bid.clone());
        Ok((bid, BidEventKind::New))
    }

    fn highest_bid(&self, listing: ListingId) -> Result<Option<Bid>, StoreError> {
        let g = self.locked();
        Ok(g.bids.get(&listing).and_then(|bids| highest_of(bids).cloned()))
    }

    fn bids_by_amount(
        &self,
        listing: ListingId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Bid>, StoreError> {
        let g = self.locked();
        let mut all: Vec<Bid> = g
            .bids
            .get(&listing)
            .map(|bids| bids.values().cloned().collect())
            .unwrap_or_default();
        // Amount descending, with the same tie-break as highest_bid so
        // pagination is stable across calls
        all.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.bidder.cmp(&b.bidder))
        });
        Ok(all.into_iter().skip(offset).take(limit).collect())
    }

    fn delete_all_bids(&self, listing: ListingId) -> Result<usize, StoreError> {
        let mut g = self.locked();
        Ok(g.bids.remove(&listing).map(|bids| bids.len()).unwrap_or(0))
    }

    fn finalize_close(
        &self,
        listing: ListingId,
        winner: &Bid,
        _now: DateTime<Utc>,
    ) -> Result<Listing, StoreError> {
        let mut g = self.locked();

        let record = g
            .listings
            .get_mut(&listing)
            .ok_or(StoreError::ListingNotFound)?;
        if record.status != ListingStatus::Active {
            return Err(StoreError::ListingNotActive {
                status: record.status,
            });
        }

        record.status = ListingStatus::Closed;
        let ticket_id = record.ticket_id;
        let closed = record.clone();

        g.tickets.insert(ticket_id, winner.bidder.clone());
        g.bids.remove(&listing);
        Ok(closed)
    }

    fn cancel_listing(&self, listing: ListingId, now: DateTime<Utc>) -> Result<Listing, StoreError> {
        let mut g = self.locked();
        let record = g
            .listings
            .get_mut(&listing)
            .ok_or(StoreError::ListingNotFound)?;
        let status = settle_expiry(record, now);
        if status != ListingStatus::Active {
            return Err(StoreError::ListingNotActive { status });
        }
        record.status = ListingStatus::Cancelled;
        Ok(record.clone())
    }

    fn ticket_owner(&self, ticket: TicketId) -> Result<WalletAddress, StoreError> {
        let g = self.locked();
        g.tickets
            .get(&ticket)
            .cloned()
            .ok_or(StoreError::TicketNotFound {
                ticket_id: ticket.as_u64(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn amt(s: &str) -> Amount {
        Amount::from_str_checked(s).unwrap()
    }

    fn active_listing(store: &MemoryStore, asking: &str, now: DateTime<Utc>) -> Listing {
        let listing = Listing::new(
            TicketId::new(1),
            WalletAddress::new("0xSeller"),
            amt(asking),
            now + Duration::hours(1),
            now,
        );
        store.create_listing(listing).unwrap()
    }

    #[test]
    fn test_first_bid_at_asking_price_accepted() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);

        let (bid, kind) = store
            .upsert_bid(l.id, &WalletAddress::new("0xA"), amt("0.5"), now)
            .unwrap();
        assert_eq!(kind, BidEventKind::New);
        assert_eq!(bid.amount, amt("0.5"));
    }

    #[test]
    fn test_first_bid_below_asking_rejected() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);

        let err = store
            .upsert_bid(l.id, &WalletAddress::new("0xA"), amt("0.4"), now)
            .unwrap_err();
        assert_eq!(err, StoreError::BidTooLow { minimum: amt("0.5") });
    }

    #[test]
    fn test_competing_bid_must_exceed_highest() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);

        store
            .upsert_bid(l.id, &WalletAddress::new("0xA"), amt("0.6"), now)
            .unwrap();
        // Equal to the highest is not enough
        let err = store
            .upsert_bid(l.id, &WalletAddress::new("0xB"), amt("0.6"), now)
            .unwrap_err();
        assert_eq!(err, StoreError::BidTooLow { minimum: amt("0.6") });

        let (_, kind) = store
            .upsert_bid(l.id, &WalletAddress::new("0xB"), amt("0.65"), now)
            .unwrap();
        assert_eq!(kind, BidEventKind::New);
    }

    #[test]
    fn test_self_raise_cas() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);
        let bidder = WalletAddress::new("0xA");

        store.upsert_bid(l.id, &bidder, amt("0.6"), now).unwrap();
        // Equal or lower than own prior fails
        assert_eq!(
            store.upsert_bid(l.id, &bidder, amt("0.6"), now).unwrap_err(),
            StoreError::StaleBid
        );
        assert_eq!(
            store.upsert_bid(l.id, &bidder, amt("0.55"), now).unwrap_err(),
            StoreError::StaleBid
        );

        let (bid, kind) = store.upsert_bid(l.id, &bidder, amt("0.7"), now).unwrap();
        assert_eq!(kind, BidEventKind::Updated);
        assert_eq!(bid.amount, amt("0.7"));
    }

    #[test]
    fn test_one_row_per_bidder() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);
        let bidder = WalletAddress::new("0xA");

        store.upsert_bid(l.id, &bidder, amt("0.6"), now).unwrap();
        store.upsert_bid(l.id, &bidder, amt("0.7"), now).unwrap();

        let bids = store.bids_by_amount(l.id, 0, 10).unwrap();
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].amount, amt("0.7"));
    }

    #[test]
    fn test_bidder_identity_case_insensitive() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);

        store
            .upsert_bid(l.id, &WalletAddress::new("0xABCD"), amt("0.6"), now)
            .unwrap();
        let (_, kind) = store
            .upsert_bid(l.id, &WalletAddress::new("0xabcd"), amt("0.7"), now)
            .unwrap();
        // Same bidder, different casing: a raise, not a second row
        assert_eq!(kind, BidEventKind::Updated);
        assert_eq!(store.bids_by_amount(l.id, 0, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_highest_bid_tie_break_earliest_created() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);
        let a = WalletAddress::new("0xA");
        let b = WalletAddress::new("0xB");

        store.upsert_bid(l.id, &a, amt("0.8"), now).unwrap();
        store
            .upsert_bid(l.id, &b, amt("0.9"), now + Duration::seconds(1))
            .unwrap();
        // A raises to match B's 0.9 via the self-raise exception, creating
        // an equal-amount tie
        store
            .upsert_bid(l.id, &a, amt("0.9"), now + Duration::seconds(2))
            .unwrap();

        // A's row was created first, so A holds the tie
        let top = store.highest_bid(l.id).unwrap().unwrap();
        assert_eq!(top.bidder, a);
        assert_eq!(top.amount, amt("0.9"));
    }

    #[test]
    fn test_bid_against_expired_listing() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);

        let late = now + Duration::hours(2);
        let err = store
            .upsert_bid(l.id, &WalletAddress::new("0xA"), amt("0.6"), late)
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::ListingNotActive {
                status: ListingStatus::Expired
            }
        );
        // Expiry was persisted by the access
        assert_eq!(
            store.listing(l.id, late).unwrap().status,
            ListingStatus::Expired
        );
    }

    #[test]
    fn test_pagination_restartable() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.1", now);

        for i in 0..5u32 {
            let bidder = WalletAddress::new(format!("0x{:02}", i));
            let amount = amt(&format!("0.{}", i + 2));
            store
                .upsert_bid(l.id, &bidder, amount, now + Duration::seconds(i as i64))
                .unwrap();
        }

        let first = store.bids_by_amount(l.id, 0, 2).unwrap();
        let second = store.bids_by_amount(l.id, 2, 2).unwrap();
        let third = store.bids_by_amount(l.id, 4, 2).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
        assert_eq!(third.len(), 1);
        assert!(first[0].amount > first[1].amount);
        assert!(first[1].amount > second[0].amount);
    }

    #[test]
    fn test_finalize_close_transfers_ownership_and_clears_bids() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);
        let buyer = WalletAddress::new("0xBuyer");

        let (winner, _) = store.upsert_bid(l.id, &buyer, amt("0.6"), now).unwrap();
        let closed = store.finalize_close(l.id, &winner, now).unwrap();

        assert_eq!(closed.status, ListingStatus::Closed);
        assert_eq!(store.ticket_owner(l.ticket_id).unwrap(), buyer);
        assert!(store.bids_by_amount(l.id, 0, 10).unwrap().is_empty());
    }

    #[test]
    fn test_finalize_close_rejects_non_active() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);
        let buyer = WalletAddress::new("0xBuyer");

        let (winner, _) = store.upsert_bid(l.id, &buyer, amt("0.6"), now).unwrap();
        store.finalize_close(l.id, &winner, now).unwrap();

        let err = store.finalize_close(l.id, &winner, now).unwrap_err();
        assert_eq!(
            err,
            StoreError::ListingNotActive {
                status: ListingStatus::Closed
            }
        );
    }

    #[test]
    fn test_one_active_listing_per_ticket() {
        let store = MemoryStore::new();
        let now = Utc::now();
        active_listing(&store, "0.5", now);

        let second = Listing::new(
            TicketId::new(1),
            WalletAddress::new("0xSeller"),
            amt("0.9"),
            now + Duration::hours(1),
            now,
        );
        let err = store.create_listing(second).unwrap_err();
        assert_eq!(err, StoreError::DuplicateActiveListing { ticket_id: 1 });
    }

    #[test]
    fn test_delete_all_bids() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);
        store
            .upsert_bid(l.id, &WalletAddress::new("0xA"), amt("0.6"), now)
            .unwrap();
        store
            .upsert_bid(l.id, &WalletAddress::new("0xB"), amt("0.7"), now)
            .unwrap();

        assert_eq!(store.delete_all_bids(l.id).unwrap(), 2);
        assert!(store.highest_bid(l.id).unwrap().is_none());
        assert!(store.bids_by_amount(l.id, 0, 10).unwrap().is_empty());

        // Idempotent on an already-empty listing
        assert_eq!(store.delete_all_bids(l.id).unwrap(), 0);
    }

    #[test]
    fn test_cancel_listing() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let l = active_listing(&store, "0.5", now);

        let cancelled = store.cancel_listing(l.id, now).unwrap();
        assert_eq!(cancelled.status, ListingStatus::Cancelled);

        let err = store.cancel_listing(l.id, now).unwrap_err();
        assert_eq!(
            err,
            StoreError::ListingNotActive {
                status: ListingStatus::Cancelled
            }
        );
    }
}
