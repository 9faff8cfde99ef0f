//! Per-instance fan-out of bid updates
//!
//! Every instance runs one `BidFeed`: publishes go through the shared bus,
//! and a relay task forwards bus messages into per-listing rooms backed by
//! broadcast channels. Locally-connected subscribers (WebSocket handlers)
//! hold a receiver for the rooms they joined; dropping the receiver leaves
//! the room.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use types::events::BidUpdateEvent;
use types::ids::ListingId;

use crate::bus::{BusError, MessageBus};
use crate::topic::{Channel, BIDS_PATTERN};

/// Default per-room buffer; lagged subscribers drop the oldest events and
/// reconcile by re-reading the highest bid
const ROOM_CAPACITY: usize = 256;

type Rooms = Arc<DashMap<ListingId, broadcast::Sender<BidUpdateEvent>>>;

/// Publish/subscribe relay for bid updates on this instance
pub struct BidFeed {
    bus: Arc<dyn MessageBus>,
    rooms: Rooms,
    relay: JoinHandle<()>,
}

impl BidFeed {
    /// Connect to the bus and start relaying into local rooms
    pub async fn connect(bus: Arc<dyn MessageBus>) -> Result<Self, BusError> {
        let mut incoming = bus.subscribe(BIDS_PATTERN).await?;
        let rooms: Rooms = Arc::new(DashMap::new());

        let relay_rooms = rooms.clone();
        let relay = tokio::spawn(async move {
            while let Some(message) = incoming.recv().await {
                let Some(channel) = Channel::parse(&message.topic) else {
                    tracing::debug!(topic = %message.topic, "ignoring unknown topic");
                    continue;
                };
                let event: BidUpdateEvent = match serde_json::from_str(&message.payload) {
                    Ok(event) => event,
                    Err(err) => {
                        tracing::warn!(topic = %message.topic, %err, "undecodable bid update");
                        continue;
                    }
                };
                if let Some(room) = relay_rooms.get(&channel.listing_id()) {
                    // No receivers is fine; the room is just idle
                    let _ = room.send(event);
                }
            }
            tracing::info!("bus subscription closed, relay stopping");
        });

        Ok(Self { bus, rooms, relay })
    }

    /// Join a listing's room
    ///
    /// Idempotent per caller: each call returns an independent receiver,
    /// and dropping it leaves the room.
    pub fn subscribe(&self, listing_id: ListingId) -> broadcast::Receiver<BidUpdateEvent> {
        self.rooms
            .entry(listing_id)
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Drop a room that has no remaining subscribers
    pub fn prune(&self, listing_id: &ListingId) {
        self.rooms
            .remove_if(listing_id, |_, sender| sender.receiver_count() == 0);
    }

    /// Publish a bid update through the shared bus
    ///
    /// Local subscribers receive it via the relay like every other
    /// instance's subscribers.
    pub async fn publish(&self, event: &BidUpdateEvent) -> Result<(), BusError> {
        let topic = Channel::Bids {
            listing_id: event.listing_id,
        }
        .to_channel_string();
        let payload =
            serde_json::to_string(event).map_err(|err| BusError::Encode(err.to_string()))?;
        self.bus.publish(&topic, payload).await
    }

    /// Number of live rooms on this instance
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Drop for BidFeed {
    fn drop(&mut self) {
        self.relay.abort();
    }
}
