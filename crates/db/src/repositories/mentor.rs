use crate::{
    DbPool,
    models::{DbMentor, DbProfile},
};
use async_trait::async_trait;
use eyre::Result;
use mentorunden_core::{
    models::{
        availability::WeeklyAvailability,
        mentor::{Mentor, Profile},
    },
    ports::MentorStore,
};
use sqlx::{Pool, Postgres, types::Json};

pub async fn get_mentor_by_id(pool: &Pool<Postgres>, id: &str) -> Result<Option<DbMentor>> {
    tracing::debug!("Getting mentor by id: {}", id);

    let mentor = sqlx::query_as::<_, DbMentor>(
        r#"
        SELECT id, user_id, bio, expertise, hourly_rate, availability, created_at
        FROM mentors
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(mentor)
}

pub async fn get_profile_by_id(pool: &Pool<Postgres>, id: &str) -> Result<Option<DbProfile>> {
    let profile = sqlx::query_as::<_, DbProfile>(
        r#"
        SELECT id, email, full_name, role
        FROM profiles
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

pub async fn update_mentor_availability(
    pool: &Pool<Postgres>,
    id: &str,
    availability: &WeeklyAvailability,
) -> Result<Option<DbMentor>> {
    let mentor = sqlx::query_as::<_, DbMentor>(
        r#"
        UPDATE mentors
        SET availability = $2
        WHERE id = $1
        RETURNING id, user_id, bio, expertise, hourly_rate, availability, created_at
        "#,
    )
    .bind(id)
    .bind(Json(availability))
    .fetch_optional(pool)
    .await?;

    if mentor.is_some() {
        tracing::debug!("Availability saved for mentor {}", id);
    }

    Ok(mentor)
}

/// Postgres-backed [`MentorStore`].
#[derive(Clone)]
pub struct PgMentorStore {
    pool: DbPool,
}

impl PgMentorStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MentorStore for PgMentorStore {
    async fn get_mentor(&self, id: &str) -> Result<Option<Mentor>> {
        Ok(get_mentor_by_id(&self.pool, id).await?.map(Mentor::from))
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        Ok(get_profile_by_id(&self.pool, user_id).await?.map(Profile::from))
    }

    async fn update_availability(
        &self,
        mentor_id: &str,
        availability: &WeeklyAvailability,
    ) -> Result<Option<Mentor>> {
        Ok(update_mentor_availability(&self.pool, mentor_id, availability)
            .await?
            .map(Mentor::from))
    }
}
