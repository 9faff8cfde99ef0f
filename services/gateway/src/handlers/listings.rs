use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::models::{CreateListingRequest, ListingResponse};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use types::errors::BidError;
use types::ids::ListingId;
use types::listing::Listing;
use types::numeric::Amount;

pub async fn create_listing(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<CreateListingRequest>,
) -> Result<Json<ListingResponse>, AppError> {
    state.rate_limiter.check(&user.wallet, "list", 10, 1.0)?;

    let asking_price = Amount::try_new(payload.asking_price).map_err(|err| {
        AppError::Market(
            BidError::InvalidAmount {
                reason: err.to_string(),
            }
            .into(),
        )
    })?;
    let now = Utc::now();
    if payload.expires_at <= now {
        return Err(AppError::BadRequest("expiration must be in the future".into()));
    }

    let listing = state.coordinator.create_listing(Listing::new(
        payload.ticket_id,
        user.wallet,
        asking_price,
        payload.expires_at,
        now,
    ))?;

    Ok(Json(listing.into()))
}

pub async fn cancel_listing(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(listing_id): Path<ListingId>,
) -> Result<Json<ListingResponse>, AppError> {
    state.rate_limiter.check(&user.wallet, "cancel", 10, 1.0)?;

    let cancelled = state
        .closer
        .cancel_listing(listing_id, &user.wallet)
        .await?;
    Ok(Json(cancelled.into()))
}
