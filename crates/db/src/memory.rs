//! Process-local store for tests and database-free development.
//!
//! All state sits behind one async mutex, so the overlap check and the insert
//! in [`BookingStore::reserve`] happen under the same lock.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use eyre::Result;
use mentorunden_core::{
    errors::{BookingError, BookingResult},
    models::{
        availability::WeeklyAvailability,
        booking::{Booking, BookingStatus, NewBooking},
        mentor::{Mentor, Profile},
    },
    ports::{BookingStore, MentorStore},
    reservation::SLOT_TAKEN,
    scheduling::overlaps,
};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
    profiles: HashMap<String, Profile>,
    mentors: HashMap<String, Mentor>,
    bookings: HashMap<String, Booking>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_profile(&self, profile: Profile) {
        self.state.lock().await.profiles.insert(profile.id.clone(), profile);
    }

    pub async fn insert_mentor(&self, mentor: Mentor) {
        self.state.lock().await.mentors.insert(mentor.id.clone(), mentor);
    }

    /// Stores a booking as-is, bypassing the overlap check.
    pub async fn insert_booking(&self, booking: Booking) {
        self.state.lock().await.bookings.insert(booking.id.clone(), booking);
    }

    pub async fn booking(&self, id: &str) -> Option<Booking> {
        self.state.lock().await.bookings.get(id).cloned()
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        let mut bookings: Vec<Booking> = self.state.lock().await.bookings.values().cloned().collect();
        bookings.sort_by_key(|b| b.start_time);
        bookings
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn get_booking(&self, id: &str) -> Result<Option<Booking>> {
        Ok(self.booking(id).await)
    }

    async fn list_mentor_bookings(
        &self,
        mentor_id: &str,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>> {
        let state = self.state.lock().await;
        let mut bookings: Vec<Booking> = state
            .bookings
            .values()
            .filter(|b| b.mentor_id == mentor_id && statuses.contains(&b.status))
            .cloned()
            .collect();
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    async fn reserve(&self, booking: NewBooking) -> BookingResult<Booking> {
        let mut state = self.state.lock().await;

        if !state.mentors.contains_key(&booking.mentor_id) {
            return Err(eyre::eyre!("Mentor {} does not exist", booking.mentor_id).into());
        }
        if !state.profiles.contains_key(&booking.student_id) {
            return Err(eyre::eyre!("Profile {} does not exist", booking.student_id).into());
        }

        let taken = state.bookings.values().any(|existing| {
            existing.mentor_id == booking.mentor_id
                && existing.status.is_live()
                && overlaps(
                    booking.start_time,
                    booking.end_time,
                    existing.start_time,
                    existing.end_time,
                )
        });
        if taken {
            debug!(mentor_id = %booking.mentor_id, start = %booking.start_time, "Interval already booked");
            return Err(BookingError::conflict(SLOT_TAKEN));
        }

        let now = Utc::now();
        let created = Booking {
            id: Uuid::new_v4().to_string(),
            student_id: booking.student_id,
            mentor_id: booking.mentor_id,
            start_time: booking.start_time,
            end_time: booking.end_time,
            status: BookingStatus::Pending,
            notes: booking.notes,
            meeting_link: booking.meeting_link,
            created_at: now,
            updated_at: now,
        };
        state.bookings.insert(created.id.clone(), created.clone());

        Ok(created)
    }

    async fn transition_status(
        &self,
        id: &str,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> Result<Option<Booking>> {
        let mut state = self.state.lock().await;
        match state.bookings.get_mut(id) {
            Some(booking) if from.contains(&booking.status) => {
                booking.status = to;
                booking.updated_at = Utc::now();
                Ok(Some(booking.clone()))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl MentorStore for InMemoryStore {
    async fn get_mentor(&self, id: &str) -> Result<Option<Mentor>> {
        Ok(self.state.lock().await.mentors.get(id).cloned())
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(self.state.lock().await.profiles.get(user_id).cloned())
    }

    async fn update_availability(
        &self,
        mentor_id: &str,
        availability: &WeeklyAvailability,
    ) -> Result<Option<Mentor>> {
        let mut state = self.state.lock().await;
        Ok(state.mentors.get_mut(mentor_id).map(|mentor| {
            mentor.availability = availability.clone();
            mentor.clone()
        }))
    }
}
