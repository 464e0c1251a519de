//! # Mentorunden API
//!
//! Web server for the Mentorunden booking service: mentors declare weekly
//! availability, students book one-hour slots, and mentors cancel bookings
//! with an email to the student.
//!
//! ## Architecture
//!
//! - **Routes**: API endpoints and URL structure
//! - **Handlers**: request parsing and response shaping
//! - **Middleware**: error-to-response mapping
//! - **Config**: environment configuration
//! - **Notifier**: outbound email delivery
//!
//! Scheduling rules live in `mentorunden-core`; storage in `mentorunden-db`.

/// Configuration module for API settings
pub mod config;
/// Request handlers
pub mod handlers;
/// Error handling shared by all handlers
pub mod middleware;
/// Email delivery
pub mod notifier;
/// Route definitions and API endpoint structure
pub mod routes;

use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use chrono_tz::Tz;
use eyre::{Result, WrapErr};
use mentorunden_core::{
    availability::AvailabilityService,
    cancellation::CancellationService,
    clock::{Clock, SystemClock},
    ports::{BookingStore, MentorStore, Notifier},
    reservation::ReservationService,
};
use mentorunden_db::{PgBookingStore, PgMentorStore};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub availability: AvailabilityService,
    pub reservations: ReservationService,
    pub cancellations: CancellationService,
}

impl ApiState {
    /// Wires the booking services to one set of collaborators.
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        mentors: Arc<dyn MentorStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        tz: Tz,
        notification_timeout: Duration,
    ) -> Self {
        Self {
            availability: AvailabilityService::new(
                mentors.clone(),
                bookings.clone(),
                clock.clone(),
                tz,
            ),
            reservations: ReservationService::new(mentors.clone(), bookings.clone(), clock, tz),
            cancellations: CancellationService::new(bookings, mentors, notifier, tz)
                .with_notification_timeout(notification_timeout),
        }
    }
}

/// Builds the application router with all routes attached to `state`
pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Booking endpoints
        .merge(routes::booking::routes())
        // Mentor availability, slot and booking listings
        .merge(routes::mentor::routes())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Result<Option<CorsLayer>> {
    if origins.is_empty() {
        return Ok(None);
    }

    let origins = origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .wrap_err("Invalid API_CORS_ORIGINS value")?;

    Ok(Some(
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
            .allow_origin(origins)
            .allow_credentials(true),
    ))
}

/// Starts the API server with the provided configuration and database connection
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// let config = mentorunden_api::config::ApiConfig::from_env()?;
/// let db_pool = mentorunden_db::create_pool(&config.database_url).await?;
/// mentorunden_api::start_server(config, db_pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, db_pool: PgPool) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(timezone = %config.timezone, "Availability is interpreted in the configured zone");

    let state = Arc::new(ApiState::new(
        Arc::new(PgBookingStore::new(db_pool.clone())),
        Arc::new(PgMentorStore::new(db_pool)),
        notifier::from_config(&config)?,
        Arc::new(SystemClock),
        config.timezone,
        Duration::from_secs(config.notification_timeout),
    ));

    let app = build_router(state).layer(
        tower::ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout))),
    );

    // Apply CORS configuration if origins are specified
    let app = match cors_layer(&config.cors_origins)? {
        Some(cors) => app.layer(cors),
        None => app,
    };

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
