use axum::http::StatusCode;
use mentorunden_api::middleware::error_handling::map_error;
use mentorunden_core::errors::BookingError;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[rstest]
#[case::validation(BookingError::validation("User ID is required"), StatusCode::BAD_REQUEST, "User ID is required")]
#[case::already_cancelled(BookingError::AlreadyCancelled, StatusCode::BAD_REQUEST, "Booking is already cancelled")]
#[case::not_found(BookingError::not_found("Booking not found"), StatusCode::NOT_FOUND, "Booking not found")]
#[case::forbidden(
    BookingError::forbidden("Only the mentor can cancel this booking"),
    StatusCode::FORBIDDEN,
    "Only the mentor can cancel this booking"
)]
#[case::conflict(
    BookingError::conflict("This time slot is no longer available"),
    StatusCode::CONFLICT,
    "This time slot is no longer available"
)]
#[case::notification(
    BookingError::Notification("smtp down".to_string()),
    StatusCode::INTERNAL_SERVER_ERROR,
    "Notification error: smtp down"
)]
#[case::database(
    BookingError::Database(eyre::eyre!("connection reset")),
    StatusCode::INTERNAL_SERVER_ERROR,
    "Database error: connection reset"
)]
#[tokio::test]
async fn test_error_mapping(
    #[case] error: BookingError,
    #[case] status: StatusCode,
    #[case] message: &str,
) {
    let response = map_error(error);

    assert_eq!(response.status(), status);
    assert_eq!(body_json(response).await, serde_json::json!({ "message": message }));
}

#[tokio::test]
async fn test_internal_errors_are_500() {
    let source: Box<dyn std::error::Error + Send + Sync> = "boom".into();

    let response = map_error(BookingError::Internal(source));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
