pub mod booking;
pub mod mentor;

pub use booking::PgBookingStore;
pub use mentor::PgMentorStore;
