//! # Booking Handlers
//!
//! Creating, listing and cancelling mentor bookings.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use mentorunden_core::{
    errors::BookingError,
    models::booking::{
        Booking, BookingStatus, CancelBookingRequest, CancelBookingResponse, ConcreteSlot,
        CreateBookingRequest, CreateBookingResponse,
    },
    reservation::{SESSION_TITLE, calendar_link},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{ApiState, middleware::error_handling::AppError};

/// Returns the trimmed value, or a validation error naming `what`.
pub(crate) fn required(value: Option<&str>, what: &str) -> Result<String, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(BookingError::validation(format!("{} is required", what)).into()),
    }
}

/// Cancels a booking on behalf of its mentor
///
/// # Endpoint
///
/// ```text
/// POST /api/bookings/:id/cancel
/// { "userId": "<mentor's user id>" }
/// ```
///
/// The booking is marked cancelled before the student is emailed. A failed
/// email does not fail the request.
///
/// # Errors
///
/// * `400` - missing user ID, or the booking is already cancelled or completed
/// * `403` - the requester is not the booking's mentor
/// * `404` - unknown booking, or its mentor no longer exists
#[axum::debug_handler]
pub async fn cancel_booking(
    State(state): State<Arc<ApiState>>,
    Path(booking_id): Path<String>,
    body: Option<Json<CancelBookingRequest>>,
) -> Result<Json<CancelBookingResponse>, AppError> {
    let booking_id = required(Some(booking_id.as_str()), "Booking ID")?;
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let user_id = required(request.user_id.as_deref(), "User ID")?;

    let outcome = state.cancellations.cancel(&booking_id, &user_id).await?;

    Ok(Json(CancelBookingResponse {
        message: "Booking cancelled successfully".to_string(),
        booking: outcome.booking,
    }))
}

/// Reserves one slot of a mentor for a student
///
/// # Endpoint
///
/// ```text
/// POST /api/bookings
/// { "mentorId": "...", "studentId": "...", "startTime": "...", "endTime": "...", "notes": "..." }
/// ```
///
/// Responds `201` with the pending booking and its calendar link, `409`
/// when the slot was taken in the meantime.
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let Json(request) = body?;
    let mentor_id = required(request.mentor_id.as_deref(), "Mentor ID")?;
    let student_id = required(request.student_id.as_deref(), "Student ID")?;

    let slot = ConcreteSlot {
        start: request.start_time,
        end: request.end_time,
    };
    let booking = state
        .reservations
        .reserve(&mentor_id, slot, &student_id, request.notes)
        .await?;

    let calendar_link = calendar_link(
        SESSION_TITLE,
        booking.start_time,
        booking.end_time,
        booking.notes.as_deref(),
        booking.meeting_link.as_deref(),
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            booking,
            calendar_link,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct BookingsQuery {
    /// Comma-separated statuses; pending and confirmed when absent
    pub status: Option<String>,
}

/// Lists a mentor's bookings, earliest first
///
/// ```text
/// GET /api/mentors/:id/bookings?status=pending,confirmed
/// ```
pub async fn list_mentor_bookings(
    State(state): State<Arc<ApiState>>,
    Path(mentor_id): Path<String>,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let statuses = match query.status.as_deref().map(str::trim) {
        None | Some("") => BookingStatus::LIVE.to_vec(),
        Some(list) => list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse::<BookingStatus>)
            .collect::<Result<Vec<_>, _>>()?,
    };

    let bookings = state
        .reservations
        .mentor_bookings(&mentor_id, &statuses)
        .await?;
    Ok(Json(bookings))
}
