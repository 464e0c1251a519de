use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::{booking::Booking, mentor::Profile};

pub const CANCELLATION_SUBJECT: &str = "Session Cancelled - Mentorunden";

const FALLBACK_STUDENT_NAME: &str = "Student";
const FALLBACK_MENTOR_NAME: &str = "Mentor";

/// Everything needed to tell a student their session was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationEmail {
    pub student_email: String,
    pub student_name: String,
    pub mentor_name: String,
    pub session_date: NaiveDate,
    /// Local time range, e.g. "9:00 AM - 10:00 AM".
    pub session_time: String,
}

impl CancellationEmail {
    /// Builds the email for `booking` with times shown in `tz`.
    ///
    /// Returns `None` when the student has no address to write to.
    pub fn for_booking<Tz: TimeZone>(
        booking: &Booking,
        student: Option<&Profile>,
        mentor: Option<&Profile>,
        tz: &Tz,
    ) -> Option<Self>
    where
        Tz::Offset: std::fmt::Display,
    {
        let student_email = student
            .and_then(|p| p.email.as_deref())
            .map(str::trim)
            .filter(|email| !email.is_empty())?
            .to_string();

        let start = booking.start_time.with_timezone(tz);
        let end = booking.end_time.with_timezone(tz);

        Some(Self {
            student_email,
            student_name: display_name(student, FALLBACK_STUDENT_NAME),
            mentor_name: display_name(mentor, FALLBACK_MENTOR_NAME),
            session_date: start.date_naive(),
            session_time: format!(
                "{} - {}",
                start.format("%-I:%M %p"),
                end.format("%-I:%M %p")
            ),
        })
    }

    pub fn subject(&self) -> &'static str {
        CANCELLATION_SUBJECT
    }

    /// Long-form date, e.g. "Monday, December 30, 2024".
    pub fn formatted_date(&self) -> String {
        self.session_date.format("%A, %B %-d, %Y").to_string()
    }

    pub fn text_body(&self, web_url: &str) -> String {
        format!(
            "Dear {student},\n\n\
             We regret to inform you that your mentoring session has been cancelled.\n\n\
             Session Details:\n\
             - Mentor: {mentor}\n\
             - Date: {date}\n\
             - Time: {time}\n\n\
             We apologize for any inconvenience this may cause. You can book a new session \
             with your mentor or browse other available mentors at {web_url}/mentors.\n\n\
             Best regards,\n\
             The Mentorunden Team\n",
            student = self.student_name,
            mentor = self.mentor_name,
            date = self.formatted_date(),
            time = self.session_time,
            web_url = web_url.trim_end_matches('/'),
        )
    }

    pub fn html_body(&self, web_url: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1>Session Cancelled</h1>
    <p>Dear {student},</p>
    <p>We regret to inform you that your mentoring session has been cancelled.</p>
    <p><strong>Session Details:</strong></p>
    <ul>
      <li><strong>Mentor:</strong> {mentor}</li>
      <li><strong>Date:</strong> {date}</li>
      <li><strong>Time:</strong> {time}</li>
    </ul>
    <p>We apologize for any inconvenience this may cause. You can book a new session with your mentor or browse other available mentors.</p>
    <a href="{web_url}/mentors">Browse Mentors</a>
    <p>Best regards,<br>The Mentorunden Team</p>
  </div>
</body>
</html>
"#,
            student = escape_html(&self.student_name),
            mentor = escape_html(&self.mentor_name),
            date = self.formatted_date(),
            time = self.session_time,
            web_url = web_url.trim_end_matches('/'),
        )
    }
}

fn display_name(profile: Option<&Profile>, fallback: &str) -> String {
    profile
        .and_then(|p| p.full_name.as_deref())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
