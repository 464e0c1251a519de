use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::availability::WeeklyAvailability;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    Student,
    Mentor,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mentor {
    pub id: String,
    /// The user account that owns this mentor record.
    pub user_id: String,
    pub bio: Option<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    pub hourly_rate: Option<f64>,
    #[serde(default)]
    pub availability: WeeklyAvailability,
    pub created_at: DateTime<Utc>,
}

/// Display profile of any user, student or mentor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}
