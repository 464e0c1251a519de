//! Slot generation and conflict resolution.
//!
//! Turns a mentor's weekly declaration into the concrete, bookable one-hour
//! slots of a single calendar date. Wall-clock values are anchored in one
//! configured zone; everything returned is UTC.
//!
//! The output depends only on its inputs and the supplied `now`, so callers
//! that need reproducible results pass a fixed instant.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::{
    errors::BookingResult,
    models::{
        availability::{DayOfWeek, WeeklyAvailability},
        booking::{Booking, ConcreteSlot},
    },
};

/// Fixed length of every bookable slot.
pub const SLOT_MINUTES: i64 = 60;

pub fn slot_duration() -> Duration {
    Duration::minutes(SLOT_MINUTES)
}

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// share at least one instant. Back-to-back intervals do not overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Only pending and confirmed bookings block a slot.
pub fn conflicts_with(slot: &ConcreteSlot, booking: &Booking) -> bool {
    booking.status.is_live() && overlaps(slot.start, slot.end, booking.start_time, booking.end_time)
}

/// Lazily yields back-to-back slots from `start` while they fit before `end`.
pub fn window_slots(start: DateTime<Utc>, end: DateTime<Utc>) -> impl Iterator<Item = ConcreteSlot> {
    let step = slot_duration();
    std::iter::successors(Some(start), move |current| Some(*current + step))
        .map(move |slot_start| ConcreteSlot {
            start: slot_start,
            end: slot_start + step,
        })
        .take_while(move |slot| slot.end <= end)
}

#[derive(Debug, Clone)]
pub struct AvailabilityEngine<Tz: TimeZone> {
    tz: Tz,
}

impl<Tz: TimeZone> AvailabilityEngine<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Every slot the declaration generates on `date`, ignoring bookings and
    /// the current time. Windows are processed in declaration order and
    /// overlapping windows are not merged.
    pub fn candidate_slots(
        &self,
        date: NaiveDate,
        availability: &WeeklyAvailability,
    ) -> BookingResult<Vec<ConcreteSlot>> {
        let day = DayOfWeek::from(date.weekday());

        let mut slots = Vec::new();
        for window in availability.windows_for(day) {
            let (start_time, end_time) = window.bounds()?;
            let (Some(start), Some(end)) = (
                self.resolve_local(date.and_time(start_time)),
                self.resolve_local(date.and_time(end_time)),
            ) else {
                continue;
            };
            slots.extend(window_slots(start, end));
        }

        Ok(slots)
    }

    /// Open slots on `date`: candidates that start strictly after `now` and
    /// do not overlap a pending or confirmed booking.
    pub fn available_slots(
        &self,
        date: NaiveDate,
        availability: &WeeklyAvailability,
        bookings: &[Booking],
        now: DateTime<Utc>,
    ) -> BookingResult<Vec<ConcreteSlot>> {
        let slots = self
            .candidate_slots(date, availability)?
            .into_iter()
            .filter(|slot| slot.start > now)
            .filter(|slot| !bookings.iter().any(|booking| conflicts_with(slot, booking)))
            .collect();

        Ok(slots)
    }

    /// The calendar date `instant` falls on in the engine's zone.
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Maps a wall-clock time to an instant. Repeated times take the earlier
    /// instant; times inside a DST gap are pushed forward by the gap.
    fn resolve_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.tz.from_local_datetime(&local) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => self
                .tz
                .from_local_datetime(&(local - Duration::hours(1)))
                .earliest()
                .map(|dt| dt.with_timezone(&Utc) + Duration::hours(1)),
        }
    }
}
