use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::{
    clock::Clock,
    errors::{BookingError, BookingResult},
    models::{
        availability::WeeklyAvailability,
        booking::{BookingStatus, ConcreteSlot},
        mentor::Mentor,
    },
    ports::{BookingStore, MentorStore},
    scheduling::AvailabilityEngine,
};

pub const MENTOR_NOT_FOUND: &str = "Mentor not found";

/// Reads and maintains mentors' weekly declarations and answers
/// "which slots are open on this date" queries.
#[derive(Clone)]
pub struct AvailabilityService {
    mentors: Arc<dyn MentorStore>,
    bookings: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
    engine: AvailabilityEngine<Tz>,
}

impl AvailabilityService {
    pub fn new(
        mentors: Arc<dyn MentorStore>,
        bookings: Arc<dyn BookingStore>,
        clock: Arc<dyn Clock>,
        tz: Tz,
    ) -> Self {
        Self {
            mentors,
            bookings,
            clock,
            engine: AvailabilityEngine::new(tz),
        }
    }

    pub async fn get_availability(&self, mentor_id: &str) -> BookingResult<WeeklyAvailability> {
        Ok(self.load_mentor(mentor_id).await?.availability)
    }

    pub async fn available_slots(
        &self,
        mentor_id: &str,
        date: NaiveDate,
    ) -> BookingResult<Vec<ConcreteSlot>> {
        let mentor = self.load_mentor(mentor_id).await?;
        if mentor.availability.is_empty() {
            debug!(mentor_id, "Mentor has not declared any availability");
            return Ok(Vec::new());
        }

        let bookings = self
            .bookings
            .list_mentor_bookings(mentor_id, &BookingStatus::LIVE)
            .await?;

        let slots = self.engine.available_slots(
            date,
            &mentor.availability,
            &bookings,
            self.clock.now(),
        )?;

        debug!(mentor_id, %date, open = slots.len(), "Computed open slots");
        Ok(slots)
    }

    pub async fn update_availability(
        &self,
        mentor_id: &str,
        requester_id: &str,
        availability: WeeklyAvailability,
    ) -> BookingResult<WeeklyAvailability> {
        let mentor = self.load_mentor(mentor_id).await?;
        if mentor.user_id != requester_id {
            return Err(BookingError::forbidden(
                "Only the mentor can update their availability",
            ));
        }

        availability.validate()?;

        let updated = self
            .mentors
            .update_availability(mentor_id, &availability)
            .await?
            .ok_or_else(|| BookingError::not_found(MENTOR_NOT_FOUND))?;

        info!(
            mentor_id,
            windows = updated.availability.time_slots.len(),
            "Availability updated"
        );
        Ok(updated.availability)
    }

    async fn load_mentor(&self, mentor_id: &str) -> BookingResult<Mentor> {
        self.mentors
            .get_mentor(mentor_id)
            .await?
            .ok_or_else(|| BookingError::not_found(MENTOR_NOT_FOUND))
    }
}
