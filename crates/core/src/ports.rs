//! Collaborators the booking services depend on.
//!
//! Each service takes these as explicit trait objects, so production wiring
//! passes the Postgres stores and tests pass in-memory stores or mocks.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    errors::BookingResult,
    models::{
        availability::WeeklyAvailability,
        booking::{Booking, BookingStatus, NewBooking},
        mentor::{Mentor, Profile},
    },
    notification::CancellationEmail,
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get_booking(&self, id: &str) -> eyre::Result<Option<Booking>>;

    /// Bookings of one mentor whose status is in `statuses`, ordered by start.
    async fn list_mentor_bookings(
        &self,
        mentor_id: &str,
        statuses: &[BookingStatus],
    ) -> eyre::Result<Vec<Booking>>;

    /// Inserts a pending booking unless it overlaps a pending or confirmed
    /// booking of the same mentor. The check and the insert are one atomic
    /// step; losing a race yields `BookingError::Conflict`.
    async fn reserve(&self, booking: NewBooking) -> BookingResult<Booking>;

    /// Compare-and-set on status: moves booking `id` to `to` only if its
    /// current status is one of `from`. `None` when nothing was updated.
    async fn transition_status(
        &self,
        id: &str,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> eyre::Result<Option<Booking>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MentorStore: Send + Sync {
    async fn get_mentor(&self, id: &str) -> eyre::Result<Option<Mentor>>;

    async fn get_profile(&self, user_id: &str) -> eyre::Result<Option<Profile>>;

    /// Replaces the mentor's declaration. `None` if the mentor does not exist.
    async fn update_availability(
        &self,
        mentor_id: &str,
        availability: &WeeklyAvailability,
    ) -> eyre::Result<Option<Mentor>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_cancellation_email(&self, email: &CancellationEmail) -> eyre::Result<()>;
}
