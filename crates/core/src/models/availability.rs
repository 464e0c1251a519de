use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::errors::{BookingError, BookingResult};

/// Wall-clock format used for declared window bounds.
pub const LOCAL_TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// One recurring window, e.g. every Monday 09:00-12:00.
///
/// Bounds are kept as the `HH:MM` strings the mentor submitted and parsed
/// on use, so a malformed stored value surfaces as a validation error
/// instead of silently producing slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityWindow {
    pub day: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

impl AvailabilityWindow {
    pub fn new(day: DayOfWeek, start_time: &str, end_time: &str) -> Self {
        Self {
            day,
            start_time: start_time.to_string(),
            end_time: end_time.to_string(),
        }
    }

    /// Parses both bounds into wall-clock times.
    pub fn bounds(&self) -> BookingResult<(NaiveTime, NaiveTime)> {
        Ok((
            parse_local_time(&self.start_time)?,
            parse_local_time(&self.end_time)?,
        ))
    }
}

/// A mentor's recurring weekly declaration, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAvailability {
    #[serde(default)]
    pub time_slots: Vec<AvailabilityWindow>,
}

impl WeeklyAvailability {
    pub fn new(time_slots: Vec<AvailabilityWindow>) -> Self {
        Self { time_slots }
    }

    pub fn is_empty(&self) -> bool {
        self.time_slots.is_empty()
    }

    /// Windows declared for `day`, in declaration order.
    pub fn windows_for(&self, day: DayOfWeek) -> impl Iterator<Item = &AvailabilityWindow> {
        self.time_slots.iter().filter(move |window| window.day == day)
    }

    /// Rejects unparseable bounds and empty or inverted windows.
    pub fn validate(&self) -> BookingResult<()> {
        for (index, window) in self.time_slots.iter().enumerate() {
            let (start, end) = window.bounds()?;
            if start >= end {
                return Err(BookingError::validation(format!(
                    "Time slot {} ends before it starts ({} - {})",
                    index + 1,
                    window.start_time,
                    window.end_time
                )));
            }
        }
        Ok(())
    }
}

pub fn parse_local_time(value: &str) -> BookingResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), LOCAL_TIME_FORMAT)
        .map_err(|_| BookingError::validation(format!("Invalid time '{}', expected HH:MM", value)))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAvailabilityRequest {
    pub user_id: Option<String>,
    #[serde(default)]
    pub time_slots: Vec<AvailabilityWindow>,
}
