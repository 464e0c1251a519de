use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::{Rng, distributions::Alphanumeric};
use tracing::{info, warn};

use crate::{
    availability::MENTOR_NOT_FOUND,
    clock::Clock,
    errors::{BookingError, BookingResult},
    models::booking::{Booking, BookingStatus, ConcreteSlot, NewBooking},
    ports::{BookingStore, MentorStore},
    scheduling::{AvailabilityEngine, slot_duration},
};

pub const SLOT_TAKEN: &str = "This time slot is no longer available";
pub const STUDENT_NOT_FOUND: &str = "Student not found";

const MEETING_BASE_URL: &str = "https://meet.google.com";
const CALENDAR_TEMPLATE_URL: &str = "https://calendar.google.com/calendar/render";
pub const SESSION_TITLE: &str = "Mentorunden mentoring session";

/// Creates bookings without ever letting two live bookings of one mentor
/// overlap. The overlap check itself runs inside the store's atomic
/// reserve; this service only rejects requests that could never be valid.
#[derive(Clone)]
pub struct ReservationService {
    mentors: Arc<dyn MentorStore>,
    bookings: Arc<dyn BookingStore>,
    clock: Arc<dyn Clock>,
    engine: AvailabilityEngine<Tz>,
}

impl ReservationService {
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

    pub async fn reserve(
        &self,
        mentor_id: &str,
        slot: ConcreteSlot,
        requester_id: &str,
        notes: Option<String>,
    ) -> BookingResult<Booking> {
        if slot.start >= slot.end {
            return Err(BookingError::validation("Booking must end after it starts"));
        }
        if slot.end - slot.start != slot_duration() {
            return Err(BookingError::validation(format!(
                "Bookings must be exactly {} minutes long",
                slot_duration().num_minutes()
            )));
        }
        if slot.start <= self.clock.now() {
            return Err(BookingError::validation("Cannot book a slot in the past"));
        }

        let mentor = self
            .mentors
            .get_mentor(mentor_id)
            .await?
            .ok_or_else(|| BookingError::not_found(MENTOR_NOT_FOUND))?;
        if self.mentors.get_profile(requester_id).await?.is_none() {
            return Err(BookingError::not_found(STUDENT_NOT_FOUND));
        }

        let date = self.engine.local_date(slot.start);
        let declared = self.engine.candidate_slots(date, &mentor.availability)?;
        if !declared.contains(&slot) {
            return Err(BookingError::validation(
                "Requested time is outside the mentor's availability",
            ));
        }

        let new_booking = NewBooking {
            student_id: requester_id.to_string(),
            mentor_id: mentor_id.to_string(),
            start_time: slot.start,
            end_time: slot.end,
            notes: notes.filter(|n| !n.trim().is_empty()),
            meeting_link: Some(generate_meeting_link()),
        };

        match self.bookings.reserve(new_booking).await {
            Ok(booking) => {
                info!(
                    booking_id = %booking.id,
                    mentor_id,
                    requester_id,
                    start = %booking.start_time,
                    "Booking reserved"
                );
                Ok(booking)
            }
            Err(BookingError::Conflict(message)) => {
                warn!(mentor_id, requester_id, start = %slot.start, "Slot already taken");
                Err(BookingError::Conflict(message))
            }
            Err(err) => Err(err),
        }
    }

    /// Bookings of one mentor filtered by status, earliest first.
    pub async fn mentor_bookings(
        &self,
        mentor_id: &str,
        statuses: &[BookingStatus],
    ) -> BookingResult<Vec<Booking>> {
        if self.mentors.get_mentor(mentor_id).await?.is_none() {
            return Err(BookingError::not_found(MENTOR_NOT_FOUND));
        }
        Ok(self.bookings.list_mentor_bookings(mentor_id, statuses).await?)
    }
}

/// Placeholder video link; no conferencing provider is contacted.
pub fn generate_meeting_link() -> String {
    let code: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(10)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("{}/{}", MEETING_BASE_URL, code)
}

/// Prefilled "add to Google Calendar" link for an interval.
pub fn calendar_link(
    title: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    description: Option<&str>,
    location: Option<&str>,
) -> String {
    const STAMP: &str = "%Y%m%dT%H%M%SZ";

    let mut link = format!(
        "{}?action=TEMPLATE&text={}&dates={}/{}",
        CALENDAR_TEMPLATE_URL,
        urlencoding::encode(title),
        start.format(STAMP),
        end.format(STAMP),
    );
    if let Some(description) = description {
        link.push_str(&format!("&details={}", urlencoding::encode(description)));
    }
    if let Some(location) = location {
        link.push_str(&format!("&location={}", urlencoding::encode(location)));
    }
    link.push_str("&sf=true&output=xml");
    link
}
