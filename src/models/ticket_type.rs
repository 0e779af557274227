use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketType {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub price: Decimal,
    /// NULL means unlimited stock.
    pub quantity_available: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewTicketType {
    pub name: String,
    pub price: Decimal,
    pub quantity_available: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TicketTypeChanges {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    /// `Some(None)` clears the limit, making stock unlimited.
    #[serde(default, with = "double_option")]
    pub quantity_available: Option<Option<i32>>,
}

/// Distinguishes an absent `quantity_available` key from an explicit null.
mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<i32>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<i32>::deserialize(deserializer).map(Some)
    }
}

impl TicketType {
    pub async fn create(pool: &PgPool, event_id: Uuid, new: NewTicketType) -> Result<TicketType, AppError> {
        validate(&new.name, new.price, new.quantity_available)?;

        let ticket_type = sqlx::query_as::<_, TicketType>(
            r#"
            INSERT INTO ticket_types (id, event_id, name, price, quantity_available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(new.name.trim())
        .bind(new.price)
        .bind(new.quantity_available)
        .fetch_one(pool)
        .await?;

        Ok(ticket_type)
    }

    pub async fn update(pool: &PgPool, id: Uuid, changes: TicketTypeChanges) -> Result<TicketType, AppError> {
        let current = TicketType::find(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket type not found".to_string()))?;

        let name = changes.name.unwrap_or(current.name);
        let price = changes.price.unwrap_or(current.price);
        let quantity_available = changes.quantity_available.unwrap_or(current.quantity_available);
        validate(&name, price, quantity_available)?;

        let ticket_type = sqlx::query_as::<_, TicketType>(
            r#"
            UPDATE ticket_types
            SET name = $2, price = $3, quantity_available = $4, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name.trim())
        .bind(price)
        .bind(quantity_available)
        .fetch_one(pool)
        .await?;

        Ok(ticket_type)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), AppError> {
        let has_orders = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM orders WHERE ticket_type_id = $1)",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;

        if has_orders {
            return Err(AppError::Conflict(
                "Ticket type cannot be deleted while orders reference it".to_string(),
            ));
        }

        let deleted = sqlx::query("DELETE FROM ticket_types WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound("Ticket type not found".to_string()));
        }

        Ok(())
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<TicketType>, AppError> {
        let ticket_type = sqlx::query_as::<_, TicketType>("SELECT * FROM ticket_types WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(ticket_type)
    }

    pub async fn list_for_event(pool: &PgPool, event_id: Uuid) -> Result<Vec<TicketType>, AppError> {
        let ticket_types = sqlx::query_as::<_, TicketType>(
            "SELECT * FROM ticket_types WHERE event_id = $1 ORDER BY price",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;

        Ok(ticket_types)
    }

    /// Takes `quantity` units out of stock, inside the caller's
    /// transaction. The row is locked for the duration, so the remaining
    /// count in the `InsufficientStock` error is exact and the decrement
    /// can never drive the counter negative. A NULL counter means
    /// unlimited stock and is left untouched.
    pub async fn reserve(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        quantity: i32,
    ) -> Result<TicketType, AppError> {
        let ticket_type = sqlx::query_as::<_, TicketType>(
            "SELECT * FROM ticket_types WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket type not found".to_string()))?;

        let Some(remaining) = ticket_type.quantity_available else {
            return Ok(ticket_type);
        };

        if remaining < quantity {
            return Err(AppError::InsufficientStock { remaining });
        }

        let updated = sqlx::query(
            r#"
            UPDATE ticket_types
            SET quantity_available = quantity_available - $2, updated_at = now()
            WHERE id = $1 AND quantity_available >= $2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::InsufficientStock { remaining });
        }

        Ok(ticket_type)
    }
}

fn validate(name: &str, price: Decimal, quantity_available: Option<i32>) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::ValidationError("Ticket type name is required".to_string()));
    }
    if price < Decimal::ZERO {
        return Err(AppError::ValidationError("Price cannot be negative".to_string()));
    }
    if let Some(quantity) = quantity_available {
        if quantity < 0 {
            return Err(AppError::ValidationError(
                "Available quantity cannot be negative".to_string(),
            ));
        }
    }
    Ok(())
}
