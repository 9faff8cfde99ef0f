use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/listings", post(handlers::listings::create_listing))
        .route("/listings/:id", delete(handlers::listings::cancel_listing))
        .route(
            "/listings/:id/bids",
            post(handlers::bids::submit_bid).get(handlers::bids::bid_history),
        )
        .route("/listings/:id/highest", get(handlers::bids::highest_bid))
        .route(
            "/listings/:id/accept",
            post(handlers::bids::accept_highest_bid),
        )
        .route("/ws", get(handlers::ws::ws_handler));

    Router::new()
        .nest("/v1", v1)
        .route("/health", get(|| async { "ok" }))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
