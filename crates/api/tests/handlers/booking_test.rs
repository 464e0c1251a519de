use std::future::IntoFuture;

use axum::http::StatusCode;
use mentorunden_core::models::booking::{Booking, BookingStatus, CreateBookingResponse};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::test_utils::{
    MENTOR_ID, MENTOR_USER_ID, OTHER_STUDENT_ID, RecordingNotifier, STUDENT_EMAIL, STUDENT_ID,
    TestContext, monday,
};

fn cancel_path(id: &str) -> String {
    format!("/api/bookings/{}/cancel", id)
}

fn booking_request(start_hour: u32) -> Value {
    json!({
        "mentorId": MENTOR_ID,
        "studentId": STUDENT_ID,
        "startTime": monday(start_hour),
        "endTime": monday(start_hour + 1),
        "notes": "Code review of my parser",
    })
}

#[test_log::test(tokio::test)]
async fn test_cancel_booking_success() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("b1", 9, BookingStatus::Confirmed).await;

    let response = ctx
        .server
        .post(&cancel_path("b1"))
        .json(&json!({ "userId": MENTOR_USER_ID }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["message"], "Booking cancelled successfully");
    assert_eq!(body["booking"]["id"], "b1");
    assert_eq!(body["booking"]["status"], "cancelled");

    let stored = ctx.store.booking("b1").await.unwrap();
    assert_eq!(stored.status, BookingStatus::Cancelled);

    let sent = ctx.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].student_email, STUDENT_EMAIL);
    assert_eq!(sent[0].session_date, monday(9).date_naive());
    assert_eq!(sent[0].session_time, "9:00 AM - 10:00 AM");
}

#[tokio::test]
async fn test_cancel_pending_booking() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("b1", 10, BookingStatus::Pending).await;

    let response = ctx
        .server
        .post(&cancel_path("b1"))
        .json(&json!({ "userId": MENTOR_USER_ID }))
        .await;

    response.assert_status_ok();
    assert_eq!(ctx.store.booking("b1").await.unwrap().status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_unknown_booking() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post(&cancel_path("ghost-id"))
        .json(&json!({ "userId": MENTOR_USER_ID }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "message": "Booking not found" }));
}

#[tokio::test]
async fn test_cancel_booking_of_missing_mentor() {
    let ctx = TestContext::new().await;
    let mut booking = ctx.seed_booking("b1", 9, BookingStatus::Confirmed).await;
    booking.mentor_id = "deleted-mentor".to_string();
    ctx.store.insert_booking(booking).await;

    let response = ctx
        .server
        .post(&cancel_path("b1"))
        .json(&json!({ "userId": MENTOR_USER_ID }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "message": "Mentor not found for this booking" }));
}

#[tokio::test]
async fn test_cancel_by_someone_else_is_forbidden() {
    let ctx = TestContext::new().await;
    let seeded = ctx.seed_booking("b1", 9, BookingStatus::Confirmed).await;

    let response = ctx
        .server
        .post(&cancel_path("b1"))
        .json(&json!({ "userId": STUDENT_ID }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    response.assert_json(&json!({ "message": "Only the mentor can cancel this booking" }));
    assert_eq!(ctx.store.booking("b1").await.unwrap(), seeded);
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_cancel_already_cancelled_booking() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("b1", 9, BookingStatus::Cancelled).await;

    let response = ctx
        .server
        .post(&cancel_path("b1"))
        .json(&json!({ "userId": MENTOR_USER_ID }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "message": "Booking is already cancelled" }));
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_cancel_twice_sends_one_email() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("b1", 9, BookingStatus::Confirmed).await;
    let body = json!({ "userId": MENTOR_USER_ID });

    ctx.server.post(&cancel_path("b1")).json(&body).await.assert_status_ok();
    let second = ctx
        .server
        .post(&cancel_path("b1"))
        .json(&body)
        .expect_failure()
        .await;

    second.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(ctx.notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_cancel_completed_booking_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("b1", 9, BookingStatus::Completed).await;

    let response = ctx
        .server
        .post(&cancel_path("b1"))
        .json(&json!({ "userId": MENTOR_USER_ID }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(ctx.store.booking("b1").await.unwrap().status, BookingStatus::Completed);
}

#[tokio::test]
async fn test_cancel_requires_user_id() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("b1", 9, BookingStatus::Confirmed).await;

    for request in [
        ctx.server.post(&cancel_path("b1")),
        ctx.server.post(&cancel_path("b1")).json(&json!({})),
        ctx.server.post(&cancel_path("b1")).json(&json!({ "userId": "   " })),
    ] {
        let response = request.expect_failure().await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "message": "User ID is required" }));
    }
    assert_eq!(ctx.store.booking("b1").await.unwrap().status, BookingStatus::Confirmed);
}

#[test_log::test(tokio::test)]
async fn test_cancel_succeeds_when_email_fails() {
    let ctx = TestContext::with_notifier(RecordingNotifier::failing()).await;
    ctx.seed_booking("b1", 9, BookingStatus::Confirmed).await;

    let response = ctx
        .server
        .post(&cancel_path("b1"))
        .json(&json!({ "userId": MENTOR_USER_ID }))
        .await;

    response.assert_status_ok();
    assert_eq!(ctx.store.booking("b1").await.unwrap().status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_for_student_without_email() {
    let ctx = TestContext::new().await;
    let mut booking = ctx.seed_booking("b1", 9, BookingStatus::Confirmed).await;
    booking.student_id = OTHER_STUDENT_ID.to_string();
    ctx.store.insert_booking(booking).await;

    let response = ctx
        .server
        .post(&cancel_path("b1"))
        .json(&json!({ "userId": MENTOR_USER_ID }))
        .await;

    response.assert_status_ok();
    assert!(ctx.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_create_booking() {
    let ctx = TestContext::new().await;

    let response = ctx.server.post("/api/bookings").json(&booking_request(10)).await;

    response.assert_status(StatusCode::CREATED);
    let created: CreateBookingResponse = response.json();
    let booking = created.booking;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.mentor_id, MENTOR_ID);
    assert_eq!(booking.student_id, STUDENT_ID);
    assert_eq!(booking.start_time, monday(10));
    assert_eq!(booking.notes.as_deref(), Some("Code review of my parser"));
    assert!(
        booking
            .meeting_link
            .as_deref()
            .is_some_and(|link| link.starts_with("https://meet.google.com/"))
    );
    assert!(created.calendar_link.starts_with(
        "https://calendar.google.com/calendar/render?action=TEMPLATE&text=Mentorunden%20mentoring%20session\
         &dates=20300107T100000Z/20300107T110000Z&details=Code%20review%20of%20my%20parser"
    ));
    assert_eq!(ctx.store.booking(&booking.id).await, Some(booking));
}

#[tokio::test]
async fn test_concurrent_bookings_for_one_slot() {
    let ctx = TestContext::new().await;
    let body = booking_request(11);

    let (first, second) = tokio::join!(
        ctx.server.post("/api/bookings").json(&body).into_future(),
        ctx.server.post("/api/bookings").json(&body).into_future(),
    );

    let mut statuses = vec![first.status_code().as_u16(), second.status_code().as_u16()];
    statuses.sort();
    assert_eq!(statuses, vec![201, 409]);
    assert_eq!(ctx.store.bookings().await.len(), 1);
}

#[tokio::test]
async fn test_create_booking_over_live_booking() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("b1", 9, BookingStatus::Pending).await;

    let response = ctx
        .server
        .post("/api/bookings")
        .json(&booking_request(9))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::CONFLICT);
    response.assert_json(&json!({ "message": "This time slot is no longer available" }));
}

#[tokio::test]
async fn test_create_booking_over_cancelled_booking() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("b1", 9, BookingStatus::Cancelled).await;

    let response = ctx.server.post("/api/bookings").json(&booking_request(9)).await;

    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_create_booking_outside_availability() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .post("/api/bookings")
        .json(&booking_request(14))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "message": "Requested time is outside the mentor's availability" }));
}

#[tokio::test]
async fn test_create_booking_in_the_past() {
    let ctx = TestContext::new().await;
    let last_monday = monday(9) - chrono::Duration::days(7);

    let response = ctx
        .server
        .post("/api/bookings")
        .json(&json!({
            "mentorId": MENTOR_ID,
            "studentId": STUDENT_ID,
            "startTime": last_monday,
            "endTime": last_monday + chrono::Duration::hours(1),
        }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "message": "Cannot book a slot in the past" }));
}

#[tokio::test]
async fn test_create_booking_for_unknown_mentor() {
    let ctx = TestContext::new().await;
    let mut body = booking_request(9);
    body["mentorId"] = json!("ghost");

    let response = ctx
        .server
        .post("/api/bookings")
        .json(&body)
        .expect_failure()
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "message": "Mentor not found" }));
}

#[tokio::test]
async fn test_create_booking_for_unknown_student() {
    let ctx = TestContext::new().await;
    let mut body = booking_request(9);
    body["studentId"] = json!("no-such-student");

    let response = ctx
        .server
        .post("/api/bookings")
        .json(&body)
        .expect_failure()
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "message": "Student not found" }));
    assert!(ctx.store.bookings().await.is_empty());
}

#[tokio::test]
async fn test_create_booking_validation() {
    let ctx = TestContext::new().await;
    let mut missing_mentor = booking_request(9);
    missing_mentor.as_object_mut().unwrap().remove("mentorId");

    let response = ctx
        .server
        .post("/api/bookings")
        .json(&missing_mentor)
        .expect_failure()
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "message": "Mentor ID is required" }));

    let malformed = ctx
        .server
        .post("/api/bookings")
        .json(&json!({ "mentorId": MENTOR_ID, "startTime": "tomorrow" }))
        .expect_failure()
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    let message = malformed.json::<Value>()["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_list_mentor_bookings() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("late", 11, BookingStatus::Pending).await;
    ctx.seed_booking("early", 9, BookingStatus::Confirmed).await;
    ctx.seed_booking("gone", 10, BookingStatus::Cancelled).await;

    let live: Vec<Booking> = ctx
        .server
        .get("/api/mentors/mentor-1/bookings")
        .await
        .json();
    let cancelled: Vec<Booking> = ctx
        .server
        .get("/api/mentors/mentor-1/bookings")
        .add_query_param("status", "cancelled")
        .await
        .json();

    let ids = |bookings: &[Booking]| bookings.iter().map(|b| b.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&live), vec!["early", "late"]);
    assert_eq!(ids(&cancelled), vec!["gone"]);
}

#[tokio::test]
async fn test_list_mentor_bookings_errors() {
    let ctx = TestContext::new().await;

    let unknown_status = ctx
        .server
        .get("/api/mentors/mentor-1/bookings")
        .add_query_param("status", "pending,archived")
        .expect_failure()
        .await;
    unknown_status.assert_status(StatusCode::BAD_REQUEST);
    unknown_status.assert_json(&json!({ "message": "Unknown booking status 'archived'" }));

    let unknown_mentor = ctx
        .server
        .get("/api/mentors/ghost/bookings")
        .expect_failure()
        .await;
    unknown_mentor.assert_status(StatusCode::NOT_FOUND);
}
