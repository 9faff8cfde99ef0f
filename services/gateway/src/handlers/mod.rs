pub mod bids;
pub mod listings;
pub mod ws;
