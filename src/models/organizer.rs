use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgExecutor;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::utils::error::AppError;

/// Grants a user management or validation rights over one event.
/// Unique per (event, user); re-granting updates the role in place.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventOrganizer {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub role: OrganizerRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "organizer_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrganizerRole {
    Owner,
    Organizer,
    Validator,
}

/// Listing row joined with the user's profile.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrganizerEntry {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub role: OrganizerRole,
    pub user_name: String,
    pub user_email: String,
}

impl EventOrganizer {
    pub async fn upsert<'e, E>(
        executor: E,
        event_id: Uuid,
        user_id: Uuid,
        role: OrganizerRole,
    ) -> Result<EventOrganizer, AppError>
    where
        E: PgExecutor<'e>,
    {
        let organizer = sqlx::query_as::<_, EventOrganizer>(
            r#"
            INSERT INTO event_organizers (event_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id, user_id) DO UPDATE SET role = EXCLUDED.role
            RETURNING *
            "#,
        )
        .bind(event_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(organizer)
    }

    pub async fn remove(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let removed = sqlx::query(
            "DELETE FROM event_organizers WHERE event_id = $1 AND user_id = $2",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?
        .rows_affected();

        if removed == 0 {
            return Err(AppError::NotFound("Organizer not found for this event".to_string()));
        }

        Ok(())
    }

    pub async fn list_for_event(pool: &PgPool, event_id: Uuid) -> Result<Vec<OrganizerEntry>, AppError> {
        let organizers = sqlx::query_as::<_, OrganizerEntry>(
            r#"
            SELECT eo.event_id, eo.user_id, eo.role,
                   u.name AS user_name, u.email AS user_email
            FROM event_organizers eo
            JOIN users u ON u.id = eo.user_id
            WHERE eo.event_id = $1
            ORDER BY eo.created_at
            "#,
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;

        Ok(organizers)
    }
}
