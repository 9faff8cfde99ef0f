use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use types::errors::{BidError, CloseError, MarketError};

/// Central error type for the gateway application
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Market(#[from] MarketError),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, detail) = match self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg, None),
            AppError::RateLimitExceeded(msg) => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED", msg, None)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            AppError::Market(err) => return market_error_response(err),
            AppError::InternalError(err) => {
                tracing::error!(%err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({ "error": code, "message": message });
        if let Some(detail) = detail {
            body["detail"] = detail;
        }
        (status, Json(body)).into_response()
    }
}

/// Map the engine's closed error taxonomy to stable HTTP responses
///
/// Every variant gets a machine-readable code so clients can handle
/// rejections deterministically; `BID_TOO_LOW` additionally reports the
/// minimum acceptable amount for immediate corrected retry.
fn market_error_response(err: MarketError) -> Response {
    let (status, code, detail) = match &err {
        MarketError::Bid(bid) => match bid {
            BidError::InvalidAmount { .. } => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT", None),
            BidError::ListingNotFound => (StatusCode::NOT_FOUND, "LISTING_NOT_FOUND", None),
            BidError::ListingNotActive { status } => (
                StatusCode::CONFLICT,
                "LISTING_NOT_ACTIVE",
                Some(json!({ "status": status.to_string() })),
            ),
            BidError::BidTooLow { minimum } => (
                StatusCode::CONFLICT,
                "BID_TOO_LOW",
                Some(json!({ "minimum": minimum })),
            ),
            BidError::StaleBid => (StatusCode::CONFLICT, "STALE_BID", None),
            BidError::ConcurrentBidConflict => {
                (StatusCode::CONFLICT, "CONCURRENT_BID_CONFLICT", None)
            }
        },
        MarketError::Close(close) => match close {
            CloseError::Unauthorized => (StatusCode::FORBIDDEN, "NOT_SELLER", None),
            CloseError::ListingNotFound => (StatusCode::NOT_FOUND, "LISTING_NOT_FOUND", None),
            CloseError::ListingNotActive { status } => (
                StatusCode::CONFLICT,
                "LISTING_NOT_ACTIVE",
                Some(json!({ "status": status.to_string() })),
            ),
            CloseError::NoBids => (StatusCode::CONFLICT, "NO_BIDS", None),
            CloseError::SettlementFailed { .. } => {
                (StatusCode::BAD_GATEWAY, "SETTLEMENT_FAILED", None)
            }
            CloseError::SettlementTimedOut { .. } => {
                (StatusCode::GATEWAY_TIMEOUT, "SETTLEMENT_TIMEOUT", None)
            }
        },
        MarketError::Store(store) => {
            tracing::error!(%store, "storage error");
            (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR", None)
        }
    };

    let mut body = json!({ "error": code, "message": err.to_string() });
    if let Some(detail) = detail {
        body["detail"] = detail;
    }
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::numeric::Amount;

    #[test]
    fn test_bid_too_low_maps_to_conflict() {
        let err = AppError::Market(
            BidError::BidTooLow {
                minimum: Amount::from_str_checked("0.65").unwrap(),
            }
            .into(),
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_not_found_mapping() {
        let err = AppError::Market(BidError::ListingNotFound.into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_settlement_timeout_maps_to_gateway_timeout() {
        let err = AppError::Market(CloseError::SettlementTimedOut { seconds: 45 }.into());
        assert_eq!(err.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_unauthorized_close_maps_to_forbidden() {
        let err = AppError::Market(CloseError::Unauthorized.into());
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }
}
