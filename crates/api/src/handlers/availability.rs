//! # Availability Handlers
//!
//! Reading and replacing a mentor's weekly availability, and listing the
//! concrete slots still open on a given date.
//!
//! Open slots are computed from the declaration each time: every window of
//! the requested weekday is cut into one-hour slots, then slots that have
//! started or collide with a pending or confirmed booking are dropped.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
};
use chrono::NaiveDate;
use mentorunden_core::{
    errors::BookingError,
    models::{
        availability::{UpdateAvailabilityRequest, WeeklyAvailability},
        booking::AvailableSlotsResponse,
    },
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{ApiState, handlers::booking::required, middleware::error_handling::AppError};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    /// Calendar date in `YYYY-MM-DD`
    pub date: Option<String>,
}

/// Returns the mentor's declared weekly windows
///
/// ```text
/// GET /api/mentors/:id/availability
/// ```
pub async fn get_availability(
    State(state): State<Arc<ApiState>>,
    Path(mentor_id): Path<String>,
) -> Result<Json<WeeklyAvailability>, AppError> {
    let availability = state.availability.get_availability(&mentor_id).await?;
    Ok(Json(availability))
}

/// Replaces the mentor's declared weekly windows
///
/// ```text
/// PUT /api/mentors/:id/availability
/// { "userId": "...", "timeSlots": [{ "day": "monday", "startTime": "09:00", "endTime": "12:00" }] }
/// ```
///
/// # Errors
///
/// * `400` - missing user ID, or a window that is unparseable or ends before it starts
/// * `403` - the requester is not the mentor
/// * `404` - unknown mentor
#[axum::debug_handler]
pub async fn update_availability(
    State(state): State<Arc<ApiState>>,
    Path(mentor_id): Path<String>,
    body: Result<Json<UpdateAvailabilityRequest>, JsonRejection>,
) -> Result<Json<WeeklyAvailability>, AppError> {
    let Json(request) = body?;
    let user_id = required(request.user_id.as_deref(), "User ID")?;

    let updated = state
        .availability
        .update_availability(&mentor_id, &user_id, WeeklyAvailability::new(request.time_slots))
        .await?;

    Ok(Json(updated))
}

/// Lists the open one-hour slots of a mentor on one date
///
/// ```text
/// GET /api/mentors/:id/slots?date=2025-01-06
/// ```
pub async fn available_slots(
    State(state): State<Arc<ApiState>>,
    Path(mentor_id): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<AvailableSlotsResponse>, AppError> {
    let raw = required(query.date.as_deref(), "date")?;
    let date = NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|_| {
        BookingError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
    })?;

    let slots = state.availability.available_slots(&mentor_id, date).await?;

    Ok(Json(AvailableSlotsResponse { date, slots }))
}
