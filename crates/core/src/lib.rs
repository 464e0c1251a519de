//! Booking domain for Mentorunden: models, errors, slot computation and the
//! reservation, cancellation and availability services.

pub mod availability;
pub mod cancellation;
pub mod clock;
pub mod errors;
pub mod models;
pub mod notification;
pub mod ports;
pub mod reservation;
pub mod scheduling;
