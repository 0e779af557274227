use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::auth::AccessScope;
use crate::models::event::Event;
use crate::models::order::Order;
use crate::utils::error::AppError;

/// One redeemable admission unit. The id doubles as the QR payload.
/// Ticket-type and holder names are copied at issuance time; later edits
/// to the ticket type or user do not alter issued tickets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    /// NULL means generated manually, not minted from a customer order.
    pub order_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub event_id: Uuid,
    pub ticket_type_name: String,
    pub holder_name: String,
    pub status: TicketStatus,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ticket_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Verified,
    Used,
}

/// What the gate sees after a scan. Only `TicketNotFound` mutates
/// nothing; `AccessGranted` is the single one-way write.
#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ValidationOutcome {
    AccessGranted {
        holder_name: String,
        used_at: Option<DateTime<Utc>>,
    },
    AlreadyUsed {
        holder_name: String,
        used_at: Option<DateTime<Utc>>,
    },
    TicketNotFound,
    InvalidTicket,
}

#[derive(Debug, Deserialize)]
pub struct GenerateTickets {
    pub event_id: Uuid,
    pub holder_name: String,
    pub quantity: i32,
    #[serde(default = "default_generated_type")]
    pub ticket_type_name: String,
}

fn default_generated_type() -> String {
    "Manual".to_string()
}

impl Ticket {
    /// Mints one ticket per unit of the order's quantity, in a single
    /// multi-row insert inside the approval transaction.
    pub async fn mint(
        tx: &mut Transaction<'_, Postgres>,
        order: &Order,
        ticket_type_name: &str,
        holder_name: &str,
    ) -> Result<Vec<Ticket>, AppError> {
        let ids: Vec<Uuid> = (0..order.quantity).map(|_| Uuid::new_v4()).collect();

        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets
                (id, order_id, user_id, event_id, ticket_type_name, holder_name, status)
            SELECT t.id, $2, $3, $4, $5, $6, 'verified'
            FROM UNNEST($1::uuid[]) AS t(id)
            RETURNING *
            "#,
        )
        .bind(&ids)
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.event_id)
        .bind(ticket_type_name)
        .bind(holder_name)
        .fetch_all(&mut **tx)
        .await?;

        Ok(tickets)
    }

    /// Admin ticket generator for comped and guest tickets: no order, no
    /// stock check, no inventory change. Tickets come out `verified` and
    /// ready to scan.
    pub async fn generate(pool: &PgPool, request: GenerateTickets) -> Result<Vec<Ticket>, AppError> {
        let holder_name = request.holder_name.trim();
        if holder_name.is_empty() {
            return Err(AppError::ValidationError("Holder name is required".to_string()));
        }
        if request.quantity <= 0 {
            return Err(AppError::ValidationError(
                "Quantity must be a positive integer".to_string(),
            ));
        }

        Event::find(pool, request.event_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        let ids: Vec<Uuid> = (0..request.quantity).map(|_| Uuid::new_v4()).collect();

        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            INSERT INTO tickets
                (id, order_id, user_id, event_id, ticket_type_name, holder_name, status)
            SELECT t.id, NULL, NULL, $2, $3, $4, 'verified'
            FROM UNNEST($1::uuid[]) AS t(id)
            RETURNING *
            "#,
        )
        .bind(&ids)
        .bind(request.event_id)
        .bind(request.ticket_type_name.trim())
        .bind(holder_name)
        .fetch_all(pool)
        .await?;

        Ok(tickets)
    }

    pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Ticket>, AppError> {
        let ticket = sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(ticket)
    }

    /// Check-in. `verified` tickets flip to `used` exactly once, with
    /// `used_at` stamped by the same statement; a lost race or a repeat
    /// scan reports `AlreadyUsed` with the original timestamp and changes
    /// nothing.
    pub async fn redeem(pool: &PgPool, ticket_id: Uuid) -> Result<ValidationOutcome, AppError> {
        let Some(ticket) = Ticket::find(pool, ticket_id).await? else {
            return Ok(ValidationOutcome::TicketNotFound);
        };

        match ticket.status {
            TicketStatus::Verified => {
                let updated = sqlx::query_as::<_, Ticket>(
                    r#"
                    UPDATE tickets
                    SET status = 'used', used_at = now()
                    WHERE id = $1 AND status = 'verified'
                    RETURNING *
                    "#,
                )
                .bind(ticket_id)
                .fetch_optional(pool)
                .await?;

                match updated {
                    Some(ticket) => Ok(ValidationOutcome::AccessGranted {
                        holder_name: ticket.holder_name,
                        used_at: ticket.used_at,
                    }),
                    // Another scan won the transition between our read and
                    // write.
                    None => match Ticket::find(pool, ticket_id).await? {
                        Some(ticket) if ticket.status == TicketStatus::Used => {
                            Ok(ValidationOutcome::AlreadyUsed {
                                holder_name: ticket.holder_name,
                                used_at: ticket.used_at,
                            })
                        }
                        _ => Ok(ValidationOutcome::InvalidTicket),
                    },
                }
            }
            TicketStatus::Used => Ok(ValidationOutcome::AlreadyUsed {
                holder_name: ticket.holder_name,
                used_at: ticket.used_at,
            }),
        }
    }

    /// Scope-shaped listing: customers see the tickets they hold, event
    /// staff see tickets of the events they run.
    pub async fn list(
        pool: &PgPool,
        scope: AccessScope,
        event_id: Option<Uuid>,
    ) -> Result<Vec<Ticket>, AppError> {
        let (company, owner) = scope.params();

        let tickets = sqlx::query_as::<_, Ticket>(
            r#"
            SELECT t.* FROM tickets t
            JOIN events e ON e.id = t.event_id
            WHERE ($1::uuid IS NULL OR e.company_id = $1)
              AND ($2::uuid IS NULL OR t.user_id = $2 OR e.created_by = $2 OR EXISTS(
                    SELECT 1 FROM event_organizers eo
                    WHERE eo.event_id = e.id AND eo.user_id = $2))
              AND ($3::uuid IS NULL OR t.event_id = $3)
            ORDER BY t.created_at DESC
            "#,
        )
        .bind(company)
        .bind(owner)
        .bind(event_id)
        .fetch_all(pool)
        .await?;

        Ok(tickets)
    }
}
