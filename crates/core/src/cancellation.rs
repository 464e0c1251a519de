//! Mentor-initiated booking cancellation.
//!
//! The order of steps is fixed: authorize, reject repeats, commit the status
//! change, then notify the student. Notification is best-effort and runs
//! after the commit; its failure never undoes or fails a cancellation.

use std::{sync::Arc, time::Duration};

use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

use crate::{
    errors::{BookingError, BookingResult},
    models::{
        booking::{Booking, BookingStatus},
        mentor::Mentor,
    },
    notification::CancellationEmail,
    ports::{BookingStore, MentorStore, Notifier},
};

pub const BOOKING_NOT_FOUND: &str = "Booking not found";
pub const MENTOR_NOT_FOUND_FOR_BOOKING: &str = "Mentor not found for this booking";
pub const ONLY_MENTOR_CAN_CANCEL: &str = "Only the mentor can cancel this booking";

pub const DEFAULT_NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct CancellationOutcome {
    pub booking: Booking,
    pub notification_sent: bool,
}

#[derive(Clone)]
pub struct CancellationService {
    bookings: Arc<dyn BookingStore>,
    mentors: Arc<dyn MentorStore>,
    notifier: Arc<dyn Notifier>,
    tz: Tz,
    notification_timeout: Duration,
}

impl CancellationService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        mentors: Arc<dyn MentorStore>,
        notifier: Arc<dyn Notifier>,
        tz: Tz,
    ) -> Self {
        Self {
            bookings,
            mentors,
            notifier,
            tz,
            notification_timeout: DEFAULT_NOTIFICATION_TIMEOUT,
        }
    }

    pub fn with_notification_timeout(mut self, timeout: Duration) -> Self {
        self.notification_timeout = timeout;
        self
    }

    pub async fn cancel(
        &self,
        booking_id: &str,
        requester_id: &str,
    ) -> BookingResult<CancellationOutcome> {
        let booking = self
            .bookings
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| BookingError::not_found(BOOKING_NOT_FOUND))?;

        let mentor = self
            .mentors
            .get_mentor(&booking.mentor_id)
            .await?
            .ok_or_else(|| BookingError::not_found(MENTOR_NOT_FOUND_FOR_BOOKING))?;

        if mentor.user_id != requester_id {
            warn!(booking_id, requester_id, "Cancellation refused: requester is not the mentor");
            return Err(BookingError::forbidden(ONLY_MENTOR_CAN_CANCEL));
        }

        check_cancellable(booking.status)?;

        let cancelled = match self
            .bookings
            .transition_status(booking_id, &BookingStatus::LIVE, BookingStatus::Cancelled)
            .await?
        {
            Some(cancelled) => cancelled,
            None => return Err(self.lost_race(booking_id).await),
        };
        info!(booking_id, mentor_id = %mentor.id, "Booking cancelled");

        let notification_sent = match self.notify_student(&cancelled, &mentor).await {
            Ok(sent) => sent,
            Err(err) => {
                error!(booking_id, error = %err, "Cancellation committed but the student was not notified");
                false
            }
        };

        Ok(CancellationOutcome {
            booking: cancelled,
            notification_sent,
        })
    }

    /// The compare-and-set matched nothing: someone else changed the row
    /// between our read and our write. Report what it became.
    async fn lost_race(&self, booking_id: &str) -> BookingError {
        match self.bookings.get_booking(booking_id).await {
            Ok(Some(current)) => match check_cancellable(current.status) {
                Err(err) => err,
                Ok(()) => BookingError::Database(eyre::eyre!(
                    "booking {} could not be cancelled from status {}",
                    booking_id,
                    current.status
                )),
            },
            Ok(None) => BookingError::not_found(BOOKING_NOT_FOUND),
            Err(err) => BookingError::Database(err),
        }
    }

    async fn notify_student(&self, booking: &Booking, mentor: &Mentor) -> BookingResult<bool> {
        let student = self
            .mentors
            .get_profile(&booking.student_id)
            .await
            .map_err(|e| BookingError::Notification(format!("student profile lookup failed: {}", e)))?;
        let mentor_profile = self
            .mentors
            .get_profile(&mentor.user_id)
            .await
            .map_err(|e| BookingError::Notification(format!("mentor profile lookup failed: {}", e)))?;

        let Some(email) = CancellationEmail::for_booking(
            booking,
            student.as_ref(),
            mentor_profile.as_ref(),
            &self.tz,
        ) else {
            warn!(booking_id = %booking.id, student_id = %booking.student_id, "Student has no email address; skipping notification");
            return Ok(false);
        };

        match tokio::time::timeout(
            self.notification_timeout,
            self.notifier.send_cancellation_email(&email),
        )
        .await
        {
            Ok(Ok(())) => {
                debug!(booking_id = %booking.id, to = %email.student_email, "Cancellation email sent");
                Ok(true)
            }
            Ok(Err(err)) => Err(BookingError::Notification(err.to_string())),
            Err(_) => Err(BookingError::Notification(format!(
                "timed out after {:?}",
                self.notification_timeout
            ))),
        }
    }
}

fn check_cancellable(status: BookingStatus) -> BookingResult<()> {
    match status {
        BookingStatus::Cancelled => Err(BookingError::AlreadyCancelled),
        s if s.can_transition_to(BookingStatus::Cancelled) => Ok(()),
        _ => Err(BookingError::validation(
            "Completed bookings cannot be cancelled",
        )),
    }
}
