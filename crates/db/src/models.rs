use chrono::{DateTime, Utc};
use eyre::{Result, WrapErr};
use mentorunden_core::models::{
    availability::WeeklyAvailability,
    booking::{Booking, BookingStatus},
    mentor::{Mentor, Profile, UserRole},
};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbBooking {
    pub id: String,
    pub student_id: String,
    pub mentor_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub meeting_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbBooking> for Booking {
    type Error = eyre::Report;

    fn try_from(row: DbBooking) -> Result<Self> {
        let status = row
            .status
            .parse::<BookingStatus>()
            .map_err(|e| eyre::eyre!("{}", e))
            .wrap_err_with(|| format!("booking {} has an unreadable status", row.id))?;

        Ok(Booking {
            id: row.id,
            student_id: row.student_id,
            mentor_id: row.mentor_id,
            start_time: row.start_time,
            end_time: row.end_time,
            status,
            notes: row.notes,
            meeting_link: row.meeting_link,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbMentor {
    pub id: String,
    pub user_id: String,
    pub bio: Option<String>,
    pub expertise: Vec<String>,
    pub hourly_rate: Option<f64>,
    pub availability: Option<Json<WeeklyAvailability>>,
    pub created_at: DateTime<Utc>,
}

impl From<DbMentor> for Mentor {
    fn from(row: DbMentor) -> Self {
        Mentor {
            id: row.id,
            user_id: row.user_id,
            bio: row.bio,
            expertise: row.expertise,
            hourly_rate: row.hourly_rate,
            availability: row.availability.map(|json| json.0).unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbProfile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: String,
}

impl From<DbProfile> for Profile {
    fn from(row: DbProfile) -> Self {
        let role = match row.role.as_str() {
            "mentor" => UserRole::Mentor,
            "admin" => UserRole::Admin,
            _ => UserRole::Student,
        };
        Profile {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            role,
        }
    }
}
