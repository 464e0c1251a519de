use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/mentors/:id/availability",
            get(handlers::availability::get_availability)
                .put(handlers::availability::update_availability),
        )
        .route(
            "/api/mentors/:id/slots",
            get(handlers::availability::available_slots),
        )
        .route(
            "/api/mentors/:id/bookings",
            get(handlers::booking::list_mentor_bookings),
        )
}
