use crate::{DbPool, models::DbBooking};
use async_trait::async_trait;
use chrono::Utc;
use eyre::Result;
use mentorunden_core::{
    errors::{BookingError, BookingResult},
    models::booking::{Booking, BookingStatus, NewBooking},
    ports::BookingStore,
    reservation::SLOT_TAKEN,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// SQLSTATE raised by the `no_overlapping_live_bookings` exclusion constraint.
const EXCLUSION_VIOLATION: &str = "23P01";

pub async fn get_booking_by_id(pool: &Pool<Postgres>, id: &str) -> Result<Option<DbBooking>> {
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, student_id, mentor_id, start_time, end_time, status, notes, meeting_link, created_at, updated_at
        FROM bookings
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

pub async fn get_bookings_by_mentor(
    pool: &Pool<Postgres>,
    mentor_id: &str,
    statuses: &[String],
) -> Result<Vec<DbBooking>> {
    let bookings = sqlx::query_as::<_, DbBooking>(
        r#"
        SELECT id, student_id, mentor_id, start_time, end_time, status, notes, meeting_link, created_at, updated_at
        FROM bookings
        WHERE mentor_id = $1 AND status = ANY($2)
        ORDER BY start_time ASC
        "#,
    )
    .bind(mentor_id)
    .bind(statuses)
    .fetch_all(pool)
    .await?;

    Ok(bookings)
}

/// Inserts a pending booking unless it overlaps a live booking of the same
/// mentor. Returns `None` when the interval is taken.
///
/// The mentor row is locked for the duration of the transaction, so
/// concurrent reservations for one mentor run one after another. The
/// exclusion constraint catches anything that bypasses this path.
pub async fn reserve_booking(pool: &Pool<Postgres>, booking: &NewBooking) -> Result<Option<DbBooking>> {
    let mut tx = pool.begin().await?;

    let mentor = sqlx::query_scalar::<_, String>(
        r#"
        SELECT id FROM mentors WHERE id = $1 FOR UPDATE
        "#,
    )
    .bind(&booking.mentor_id)
    .fetch_optional(&mut *tx)
    .await?;
    if mentor.is_none() {
        return Err(eyre::eyre!("Mentor {} does not exist", booking.mentor_id));
    }

    let taken = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM bookings
            WHERE mentor_id = $1
              AND status IN ('pending', 'confirmed')
              AND start_time < $3
              AND end_time > $2
        );
        "#,
    )
    .bind(&booking.mentor_id)
    .bind(booking.start_time)
    .bind(booking.end_time)
    .fetch_one(&mut *tx)
    .await?;

    if taken {
        tracing::debug!(mentor_id = %booking.mentor_id, start = %booking.start_time, "Interval already booked");
        return Ok(None);
    }

    let now = Utc::now();
    let inserted = sqlx::query_as::<_, DbBooking>(
        r#"
        INSERT INTO bookings (id, student_id, mentor_id, start_time, end_time, status, notes, meeting_link, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, 'pending', $6, $7, $8, $8)
        RETURNING id, student_id, mentor_id, start_time, end_time, status, notes, meeting_link, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&booking.student_id)
    .bind(&booking.mentor_id)
    .bind(booking.start_time)
    .bind(booking.end_time)
    .bind(&booking.notes)
    .bind(&booking.meeting_link)
    .bind(now)
    .fetch_one(&mut *tx)
    .await;

    let inserted = match inserted {
        Ok(row) => row,
        Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some(EXCLUSION_VIOLATION) => {
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };

    tx.commit().await?;
    Ok(Some(inserted))
}

/// Compare-and-set on status. Returns the updated row, or `None` if the
/// booking is missing or its status is not in `from`.
pub async fn transition_booking_status(
    pool: &Pool<Postgres>,
    id: &str,
    from: &[String],
    to: &str,
) -> Result<Option<DbBooking>> {
    let booking = sqlx::query_as::<_, DbBooking>(
        r#"
        UPDATE bookings
        SET status = $3, updated_at = NOW()
        WHERE id = $1 AND status = ANY($2)
        RETURNING id, student_id, mentor_id, start_time, end_time, status, notes, meeting_link, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(pool)
    .await?;

    Ok(booking)
}

fn status_names(statuses: &[BookingStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// Postgres-backed [`BookingStore`].
#[derive(Clone)]
pub struct PgBookingStore {
    pool: DbPool,
}

impl PgBookingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn get_booking(&self, id: &str) -> Result<Option<Booking>> {
        get_booking_by_id(&self.pool, id)
            .await?
            .map(Booking::try_from)
            .transpose()
    }

    async fn list_mentor_bookings(
        &self,
        mentor_id: &str,
        statuses: &[BookingStatus],
    ) -> Result<Vec<Booking>> {
        get_bookings_by_mentor(&self.pool, mentor_id, &status_names(statuses))
            .await?
            .into_iter()
            .map(Booking::try_from)
            .collect()
    }

    async fn reserve(&self, booking: NewBooking) -> BookingResult<Booking> {
        match reserve_booking(&self.pool, &booking).await? {
            Some(row) => Ok(Booking::try_from(row)?),
            None => Err(BookingError::conflict(SLOT_TAKEN)),
        }
    }

    async fn transition_status(
        &self,
        id: &str,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> Result<Option<Booking>> {
        transition_booking_status(&self.pool, id, &status_names(from), to.as_str())
            .await?
            .map(Booking::try_from)
            .transpose()
    }
}
