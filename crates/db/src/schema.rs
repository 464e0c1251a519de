use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Needed for equality on text columns inside the exclusion constraint
    sqlx::query("CREATE EXTENSION IF NOT EXISTS btree_gist;")
        .execute(pool)
        .await?;

    // Create profiles table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id TEXT PRIMARY KEY,
            email VARCHAR(255) NULL,
            full_name VARCHAR(255) NULL,
            role VARCHAR(16) NOT NULL DEFAULT 'student',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_role CHECK (role IN ('student', 'mentor', 'admin'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create mentors table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS mentors (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
            user_id TEXT NOT NULL UNIQUE REFERENCES profiles(id),
            bio TEXT NULL,
            expertise TEXT[] NOT NULL DEFAULT '{}',
            hourly_rate DOUBLE PRECISION NULL,
            availability JSONB NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create bookings table; live bookings of one mentor may never overlap
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id TEXT PRIMARY KEY DEFAULT gen_random_uuid()::text,
            student_id TEXT NOT NULL REFERENCES profiles(id),
            mentor_id TEXT NOT NULL REFERENCES mentors(id),
            start_time TIMESTAMP WITH TIME ZONE NOT NULL,
            end_time TIMESTAMP WITH TIME ZONE NOT NULL,
            status VARCHAR(16) NOT NULL DEFAULT 'pending',
            notes TEXT NULL,
            meeting_link TEXT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_time > start_time),
            CONSTRAINT valid_status CHECK (status IN ('pending', 'confirmed', 'cancelled', 'completed')),
            CONSTRAINT no_overlapping_live_bookings EXCLUDE USING gist (
                mentor_id WITH =,
                tstzrange(start_time, end_time, '[)') WITH &&
            ) WHERE (status IN ('pending', 'confirmed'))
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes, one statement per prepared query
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_bookings_mentor_id ON bookings(mentor_id);",
        "CREATE INDEX IF NOT EXISTS idx_bookings_student_id ON bookings(student_id);",
        "CREATE INDEX IF NOT EXISTS idx_bookings_start_time ON bookings(start_time);",
        "CREATE INDEX IF NOT EXISTS idx_bookings_status ON bookings(status);",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
