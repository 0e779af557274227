use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::AccessScope;
use crate::models::event::{Event, EventStatus};
use crate::models::ticket::Ticket;
use crate::models::ticket_type::TicketType;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub ticket_type_id: Uuid,
    pub quantity: i32,
    /// Computed once at checkout from the ticket type's price; never
    /// recomputed afterwards.
    pub total_price: Decimal,
    pub receipt_url: String,
    pub status: OrderStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Approved,
    Rejected,
    /// Present in the data model; not reachable through the reviewer
    /// action.
    Cancelled,
}

#[derive(Debug, Deserialize)]
pub struct Checkout {
    pub event_id: Uuid,
    pub ticket_type_id: Uuid,
    pub quantity: i32,
    pub receipt_url: String,
}

/// Outcome of an approval: the reviewed order plus any tickets minted
/// for it. Rejections carry an empty ticket list.
#[derive(Debug, Serialize)]
pub struct ReviewedOrder {
    pub order: Order,
    pub tickets: Vec<Ticket>,
}

impl Order {
    pub async fn checkout(pool: &PgPool, user_id: Uuid, checkout: Checkout) -> Result<Order, AppError> {
        if checkout.quantity <= 0 {
            return Err(AppError::ValidationError(
                "Quantity must be a positive integer".to_string(),
            ));
        }
        if checkout.receipt_url.trim().is_empty() {
            return Err(AppError::ValidationError(
                "A payment receipt is required".to_string(),
            ));
        }

        let event = Event::find(pool, checkout.event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if event.informative_only {
            return Err(AppError::ValidationError(
                "This event does not sell tickets".to_string(),
            ));
        }
        if event.status != EventStatus::Active {
            return Err(AppError::ValidationError(
                "Tickets can only be ordered for active events".to_string(),
            ));
        }

        let ticket_type = TicketType::find(pool, checkout.ticket_type_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Ticket type not found".to_string()))?;

        if ticket_type.event_id != event.id {
            return Err(AppError::ValidationError(
                "Ticket type does not belong to this event".to_string(),
            ));
        }

        let total_price = ticket_type.price * Decimal::from(checkout.quantity);

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders
                (id, user_id, event_id, ticket_type_id, quantity, total_price, receipt_url, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(event.id)
        .bind(ticket_type.id)
        .bind(checkout.quantity)
        .bind(total_price)
        .bind(checkout.receipt_url.trim())
        .fetch_one(pool)
        .await?;

        Ok(order)
    }

    /// The reviewer action: moves a pending order to `approved` or
    /// `rejected`. Approval reserves stock and mints tickets before the
    /// status flips; all three run in one transaction, so a failed step
    /// leaves the order pending with nothing issued, safe to retry. The
    /// row lock on the order plus the `status = 'pending'` guard on the
    /// update keep a double-submit from issuing twice.
    pub async fn set_status(
        pool: &PgPool,
        order_id: Uuid,
        reviewer_id: Uuid,
        target: OrderStatus,
    ) -> Result<ReviewedOrder, AppError> {
        if target != OrderStatus::Approved && target != OrderStatus::Rejected {
            return Err(AppError::ValidationError(
                "Orders can only be approved or rejected".to_string(),
            ));
        }

        let mut tx = pool.begin().await?;

        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

        if order.status != OrderStatus::Pending {
            return Err(AppError::Conflict(
                "Order has already been reviewed".to_string(),
            ));
        }

        let tickets = if target == OrderStatus::Approved {
            let ticket_type = TicketType::reserve(&mut tx, order.ticket_type_id, order.quantity).await?;

            let holder_name =
                sqlx::query_scalar::<_, String>("SELECT name FROM users WHERE id = $1")
                    .bind(order.user_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Purchaser not found".to_string()))?;

            Ticket::mint(&mut tx, &order, &ticket_type.name, &holder_name).await?
        } else {
            Vec::new()
        };

        let order = sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $2, reviewed_by = $3, reviewed_at = now()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(target)
        .bind(reviewer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Conflict("Order has already been reviewed".to_string()))?;

        tx.commit().await?;

        Ok(ReviewedOrder { order, tickets })
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(order)
    }

    /// Scope-shaped listing. Owner scope covers both sides of the
    /// marketplace: a user's own purchases and the orders of events they
    /// created or organize.
    pub async fn list(
        pool: &PgPool,
        scope: AccessScope,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>, AppError> {
        let (company, owner) = scope.params();

        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT o.* FROM orders o
            JOIN events e ON e.id = o.event_id
            WHERE ($1::uuid IS NULL OR e.company_id = $1)
              AND ($2::uuid IS NULL OR o.user_id = $2 OR e.created_by = $2 OR EXISTS(
                    SELECT 1 FROM event_organizers eo
                    WHERE eo.event_id = e.id AND eo.user_id = $2))
              AND ($3::order_status IS NULL OR o.status = $3)
            ORDER BY o.created_at DESC
            "#,
        )
        .bind(company)
        .bind(owner)
        .bind(status)
        .fetch_all(pool)
        .await?;

        Ok(orders)
    }
}
