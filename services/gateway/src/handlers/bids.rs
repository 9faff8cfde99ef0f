use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{
    AcceptBidResponse, BidHistoryEntry, SubmitBidRequest, SubmitBidResponse,
};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use types::errors::BidError;
use types::ids::ListingId;
use types::numeric::Amount;

pub async fn submit_bid(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(listing_id): Path<ListingId>,
    Json(payload): Json<SubmitBidRequest>,
) -> Result<Json<SubmitBidResponse>, AppError> {
    state.rate_limiter.check(&user.wallet, "bid", 20, 5.0)?;

    let amount = Amount::try_new(payload.amount).map_err(|err| {
        AppError::Market(
            BidError::InvalidAmount {
                reason: err.to_string(),
            }
            .into(),
        )
    })?;

    let accepted = state
        .coordinator
        .submit_bid(listing_id, user.wallet, amount)
        .await?;

    Ok(Json(SubmitBidResponse {
        bid_id: accepted.bid.id,
        event_type: accepted.kind,
        amount: accepted.bid.amount.as_decimal(),
    }))
}

/// Bid history, amount descending; served from the TTL cache when warm
pub async fn bid_history(
    State(state): State<AppState>,
    Path(listing_id): Path<ListingId>,
) -> Result<Json<Vec<BidHistoryEntry>>, AppError> {
    let bids = state.coordinator.bid_history(listing_id)?;
    Ok(Json(bids.into_iter().map(BidHistoryEntry::from).collect()))
}

/// Current highest bid, or 204 when the listing has none yet
pub async fn highest_bid(
    State(state): State<AppState>,
    Path(listing_id): Path<ListingId>,
) -> Result<axum::response::Response, AppError> {
    use axum::response::IntoResponse;
    match state.coordinator.highest_bid(listing_id)? {
        Some(snapshot) => Ok(Json(snapshot).into_response()),
        None => Ok(axum::http::StatusCode::NO_CONTENT.into_response()),
    }
}

pub async fn accept_highest_bid(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(listing_id): Path<ListingId>,
) -> Result<Json<AcceptBidResponse>, AppError> {
    state.rate_limiter.check(&user.wallet, "accept", 5, 0.5)?;

    let closed = state
        .closer
        .accept_highest_bid(listing_id, &user.wallet)
        .await?;

    Ok(Json(AcceptBidResponse {
        transfer_tx: closed.receipt.tx_hash,
        winner: closed.winner.bidder,
        amount: closed.winner.amount.as_decimal(),
    }))
}
