use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::{AccessScope, AuthUser, Role};
use crate::models::organizer::{EventOrganizer, OrganizerRole};
use crate::utils::error::AppError;
use crate::utils::slug::unique_slug;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub location: String,
    pub image_url: Option<String>,
    pub status: EventStatus,
    pub company_id: Option<Uuid>,
    pub created_by: Uuid,
    pub informative_only: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Active,
    Completed,
    Cancelled,
    Hidden,
}

#[derive(Debug, Deserialize)]
pub struct NewEvent {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: DateTime<Utc>,
    pub location: String,
    pub image_url: Option<String>,
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub informative_only: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<EventStatus>,
    pub informative_only: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventFilters {
    pub status: Option<EventStatus>,
    pub category: Option<String>,
}

impl Event {
    pub async fn create(pool: &PgPool, creator: &AuthUser, new: NewEvent) -> Result<Event, AppError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError("Event name is required".to_string()));
        }
        if new.location.trim().is_empty() {
            return Err(AppError::ValidationError("Event location is required".to_string()));
        }

        let slug = unique_slug(&name, |candidate| {
            let pool = pool.clone();
            async move { slug_taken(&pool, &candidate, None).await }
        })
        .await?;

        let mut tx = pool.begin().await?;

        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events
                (id, slug, name, description, category, date, location, image_url,
                 status, company_id, created_by, informative_only)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'draft', $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&slug)
        .bind(&name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(new.date)
        .bind(new.location.trim())
        .bind(&new.image_url)
        .bind(new.company_id.or(creator.company_id))
        .bind(creator.id)
        .bind(new.informative_only)
        .fetch_one(&mut *tx)
        .await?;

        // The creator manages their own event.
        EventOrganizer::upsert(&mut *tx, event.id, creator.id, OrganizerRole::Owner).await?;

        tx.commit().await?;

        Ok(event)
    }

    pub async fn update(pool: &PgPool, id: Uuid, changes: EventChanges) -> Result<Event, AppError> {
        let current = Event::find(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let name = match changes.name {
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(AppError::ValidationError("Event name cannot be empty".to_string()));
                }
                name
            }
            None => current.name.clone(),
        };

        // The slug follows the name, skipping the event's own row in the
        // uniqueness check.
        let slug = if name != current.name {
            unique_slug(&name, |candidate| {
                let pool = pool.clone();
                async move { slug_taken(&pool, &candidate, Some(id)).await }
            })
            .await?
        } else {
            current.slug.clone()
        };

        let event = sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET slug = $2, name = $3, description = $4, category = $5, date = $6,
                location = $7, image_url = $8, status = $9, informative_only = $10,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&slug)
        .bind(&name)
        .bind(changes.description.or(current.description))
        .bind(changes.category.or(current.category))
        .bind(changes.date.unwrap_or(current.date))
        .bind(changes.location.unwrap_or(current.location))
        .bind(changes.image_url.or(current.image_url))
        .bind(changes.status.unwrap_or(current.status))
        .bind(changes.informative_only.unwrap_or(current.informative_only))
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    /// Deletion is blocked while orders reference the event; ticket types
    /// without orders cascade away with it.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        let has_orders =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM orders WHERE event_id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;

        if has_orders {
            return Err(AppError::Conflict(
                "Event cannot be deleted while orders reference it".to_string(),
            ));
        }

        let deleted = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        Ok(())
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(event)
    }

    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Event>, AppError> {
        let event = sqlx::query_as::<_, Event>("SELECT * FROM events WHERE slug = $1")
            .bind(slug)
            .fetch_optional(pool)
            .await?;

        Ok(event)
    }

    /// Public browse listing: active events only, hidden ones excluded.
    pub async fn list_public(pool: &PgPool, filters: &EventFilters) -> Result<Vec<Event>, AppError> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT * FROM events
            WHERE status = 'active'
              AND ($1::text IS NULL OR category = $1)
            ORDER BY date
            "#,
        )
        .bind(&filters.category)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    /// Management listing, shaped by the caller's access scope.
    pub async fn list(
        pool: &PgPool,
        scope: AccessScope,
        filters: &EventFilters,
    ) -> Result<Vec<Event>, AppError> {
        let (company, owner) = scope.params();

        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT e.* FROM events e
            WHERE ($1::uuid IS NULL OR e.company_id = $1)
              AND ($2::uuid IS NULL OR e.created_by = $2 OR EXISTS(
                    SELECT 1 FROM event_organizers eo
                    WHERE eo.event_id = e.id AND eo.user_id = $2))
              AND ($3::event_status IS NULL OR e.status = $3)
              AND ($4::text IS NULL OR e.category = $4)
            ORDER BY e.date
            "#,
        )
        .bind(company)
        .bind(owner)
        .bind(filters.status)
        .bind(&filters.category)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    /// Whether the user may mutate the event or review its orders:
    /// admins, the creator, and owner/organizer rows qualify.
    pub async fn user_can_manage(pool: &PgPool, event_id: Uuid, user: &AuthUser) -> Result<bool, AppError> {
        if user.role == Role::Admin {
            return Ok(true);
        }

        let allowed = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM events e
                WHERE e.id = $1 AND e.created_by = $2
                UNION
                SELECT 1 FROM event_organizers eo
                WHERE eo.event_id = $1 AND eo.user_id = $2
                  AND eo.role IN ('owner', 'organizer')
            )
            "#,
        )
        .bind(event_id)
        .bind(user.id)
        .fetch_one(pool)
        .await?;

        Ok(allowed)
    }

    /// Whether the user may check tickets in for the event. Validators
    /// assigned to the event qualify alongside its managers.
    pub async fn user_can_validate(pool: &PgPool, event_id: Uuid, user: &AuthUser) -> Result<bool, AppError> {
        if user.role == Role::Admin {
            return Ok(true);
        }

        let allowed = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM events e
                WHERE e.id = $1 AND e.created_by = $2
                UNION
                SELECT 1 FROM event_organizers eo
                WHERE eo.event_id = $1 AND eo.user_id = $2
            )
            "#,
        )
        .bind(event_id)
        .bind(user.id)
        .fetch_one(pool)
        .await?;

        Ok(allowed)
    }
}

async fn slug_taken(pool: &PgPool, slug: &str, exclude: Option<Uuid>) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM events WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
    )
    .bind(slug)
    .bind(exclude)
    .fetch_one(pool)
    .await
}
