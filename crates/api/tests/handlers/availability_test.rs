use axum::http::StatusCode;
use mentorunden_core::models::{
    availability::{AvailabilityWindow, DayOfWeek, WeeklyAvailability},
    booking::{AvailableSlotsResponse, BookingStatus, ConcreteSlot},
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

use crate::test_utils::{MENTOR_ID, MENTOR_USER_ID, STUDENT_ID, TestContext, monday};

fn slot(hour: u32) -> ConcreteSlot {
    ConcreteSlot {
        start: monday(hour),
        end: monday(hour + 1),
    }
}

async fn open_slots(ctx: &TestContext, mentor_id: &str, date: &str) -> AvailableSlotsResponse {
    ctx.server
        .get(&format!("/api/mentors/{}/slots", mentor_id))
        .add_query_param("date", date)
        .await
        .json()
}

#[tokio::test]
async fn test_get_availability() {
    let ctx = TestContext::new().await;

    let response = ctx.server.get("/api/mentors/mentor-1/availability").await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "timeSlots": [{ "day": "monday", "startTime": "09:00", "endTime": "12:00" }]
    }));
}

#[tokio::test]
async fn test_get_availability_of_unknown_mentor() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .get("/api/mentors/ghost/availability")
        .expect_failure()
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "message": "Mentor not found" }));
}

#[tokio::test]
async fn test_update_availability() {
    let ctx = TestContext::new().await;
    let body = json!({
        "userId": MENTOR_USER_ID,
        "timeSlots": [
            { "day": "monday", "startTime": "13:00", "endTime": "15:00" },
            { "day": "wednesday", "startTime": "08:00", "endTime": "09:00" }
        ]
    });

    let response = ctx
        .server
        .put("/api/mentors/mentor-1/availability")
        .json(&body)
        .await;

    response.assert_status_ok();
    let expected = WeeklyAvailability::new(vec![
        AvailabilityWindow::new(DayOfWeek::Monday, "13:00", "15:00"),
        AvailabilityWindow::new(DayOfWeek::Wednesday, "08:00", "09:00"),
    ]);
    assert_eq!(response.json::<WeeklyAvailability>(), expected);

    let slots = open_slots(&ctx, MENTOR_ID, "2030-01-07").await;
    assert_eq!(slots.slots, vec![slot(13), slot(14)]);
}

#[tokio::test]
async fn test_update_availability_by_someone_else() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .put("/api/mentors/mentor-1/availability")
        .json(&json!({ "userId": STUDENT_ID, "timeSlots": [] }))
        .expect_failure()
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    response.assert_json(&json!({ "message": "Only the mentor can update their availability" }));
    assert_eq!(open_slots(&ctx, MENTOR_ID, "2030-01-07").await.slots.len(), 3);
}

#[rstest]
#[case::missing_user(json!({ "timeSlots": [] }))]
#[case::end_before_start(json!({
    "userId": MENTOR_USER_ID,
    "timeSlots": [{ "day": "monday", "startTime": "12:00", "endTime": "09:00" }]
}))]
#[case::unparseable_time(json!({
    "userId": MENTOR_USER_ID,
    "timeSlots": [{ "day": "monday", "startTime": "9am", "endTime": "12:00" }]
}))]
#[case::unknown_day(json!({
    "userId": MENTOR_USER_ID,
    "timeSlots": [{ "day": "funday", "startTime": "09:00", "endTime": "12:00" }]
}))]
#[tokio::test]
async fn test_update_availability_rejects_bad_input(#[case] body: serde_json::Value) {
    let ctx = TestContext::new().await;

    let response = ctx
        .server
        .put("/api/mentors/mentor-1/availability")
        .json(&body)
        .expect_failure()
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_available_slots() {
    let ctx = TestContext::new().await;

    let response = open_slots(&ctx, MENTOR_ID, "2030-01-07").await;

    assert_eq!(response.date, monday(0).date_naive());
    assert_eq!(response.slots, vec![slot(9), slot(10), slot(11)]);
}

#[tokio::test]
async fn test_available_slots_exclude_live_bookings() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("b1", 10, BookingStatus::Confirmed).await;
    ctx.seed_booking("b2", 11, BookingStatus::Cancelled).await;

    let response = open_slots(&ctx, MENTOR_ID, "2030-01-07").await;

    assert_eq!(response.slots, vec![slot(9), slot(11)]);
}

#[tokio::test]
async fn test_cancelling_frees_the_slot() {
    let ctx = TestContext::new().await;
    ctx.seed_booking("b1", 10, BookingStatus::Pending).await;

    ctx.server
        .post("/api/bookings/b1/cancel")
        .json(&json!({ "userId": MENTOR_USER_ID }))
        .await
        .assert_status_ok();

    let response = open_slots(&ctx, MENTOR_ID, "2030-01-07").await;
    assert_eq!(response.slots, vec![slot(9), slot(10), slot(11)]);
}

#[rstest]
#[case::tuesday("2030-01-08")]
#[case::past_monday("2029-12-31")]
#[tokio::test]
async fn test_no_slots(#[case] date: &str) {
    let ctx = TestContext::new().await;

    let response = open_slots(&ctx, MENTOR_ID, date).await;

    assert!(response.slots.is_empty());
}

#[tokio::test]
async fn test_available_slots_errors() {
    let ctx = TestContext::new().await;

    let missing = ctx
        .server
        .get("/api/mentors/mentor-1/slots")
        .expect_failure()
        .await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    missing.assert_json(&json!({ "message": "date is required" }));

    let malformed = ctx
        .server
        .get("/api/mentors/mentor-1/slots")
        .add_query_param("date", "07/01/2030")
        .expect_failure()
        .await;
    malformed.assert_status(StatusCode::BAD_REQUEST);
    malformed.assert_json(&json!({ "message": "Invalid date '07/01/2030', expected YYYY-MM-DD" }));

    let unknown = ctx
        .server
        .get("/api/mentors/ghost/slots")
        .add_query_param("date", "2030-01-07")
        .expect_failure()
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);
}
