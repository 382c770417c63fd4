use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, change_booking_status, check_availability, create_booking, owner_bookings,
    user_bookings,
};

/// Creates the API router with all booking endpoints
///
/// - POST /api/bookings/check-availability - Search available cars
/// - POST /api/bookings/create - Create a booking (authenticated)
/// - GET /api/bookings/user - Caller's bookings (authenticated)
/// - GET /api/bookings/owner - Bookings on caller's cars (authenticated, owner)
/// - POST /api/bookings/change-status - Change booking status (authenticated)
pub fn create_router(state: Arc<AppState>) -> Router {
    let bookings = Router::new()
        .route("/check-availability", post(check_availability))
        .route("/create", post(create_booking))
        .route("/user", get(user_bookings))
        .route("/owner", get(owner_bookings))
        .route("/change-status", post(change_booking_status));

    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .nest("/api/bookings", bookings)
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
