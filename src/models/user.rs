use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::utils::error::AppError;

/// Local mirror of the identity provider's account. Rows exist so that
/// orders and tickets have a referent; the provider remains the source
/// of truth for authentication.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub company_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Organizer,
    Validator,
    Customer,
}

#[derive(Debug, Deserialize)]
pub struct SyncProfile {
    pub name: String,
    pub email: String,
}

impl User {
    /// Upserts the caller's profile after the identity provider has
    /// authenticated them. Role and company come from the verified claim,
    /// never from the request body.
    pub async fn sync(
        pool: &PgPool,
        id: Uuid,
        role: UserRole,
        company_id: Option<Uuid>,
        profile: &SyncProfile,
    ) -> Result<User, AppError> {
        let name = profile.name.trim();
        let email = profile.email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(AppError::ValidationError(
                "Name and email are required".to_string(),
            ));
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, role, company_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name,
                    email = EXCLUDED.email,
                    role = EXCLUDED.role,
                    company_id = EXCLUDED.company_id,
                    updated_at = now()
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(role)
        .bind(company_id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }
}
