pub mod availability;
pub mod booking;
