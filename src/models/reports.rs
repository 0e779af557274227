use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::AccessScope;
use crate::utils::error::AppError;

/// Dashboard rollups, computed by query at request time. Nothing is
/// materialized; two dashboards rendered back to back may differ.
#[derive(Debug, Serialize, FromRow)]
pub struct EventSummary {
    pub total_revenue: Decimal,
    pub orders_pending: i64,
    pub orders_approved: i64,
    pub orders_rejected: i64,
    pub tickets_issued: i64,
    pub tickets_used: i64,
    pub events_total: i64,
    pub events_active: i64,
}

/// The customer's slice: their own orders and tickets.
#[derive(Debug, Serialize, FromRow)]
pub struct CustomerSummary {
    pub orders_pending: i64,
    pub orders_approved: i64,
    pub orders_rejected: i64,
    pub total_spent: Decimal,
    pub tickets_held: i64,
    pub tickets_used: i64,
}

pub struct Reports;

impl Reports {
    /// Revenue counts only approved orders; pending receipts are not
    /// money yet.
    pub async fn event_summary(pool: &PgPool, scope: AccessScope) -> Result<EventSummary, AppError> {
        let (company, owner) = scope.params();

        let summary = sqlx::query_as::<_, EventSummary>(
            r#"
            WITH scoped_events AS (
                SELECT e.id, e.status FROM events e
                WHERE ($1::uuid IS NULL OR e.company_id = $1)
                  AND ($2::uuid IS NULL OR e.created_by = $2 OR EXISTS(
                        SELECT 1 FROM event_organizers eo
                        WHERE eo.event_id = e.id AND eo.user_id = $2))
            )
            SELECT
                (SELECT COALESCE(SUM(o.total_price), 0) FROM orders o
                  WHERE o.event_id IN (SELECT id FROM scoped_events)
                    AND o.status = 'approved')                          AS total_revenue,
                (SELECT COUNT(*) FROM orders o
                  WHERE o.event_id IN (SELECT id FROM scoped_events)
                    AND o.status = 'pending')                           AS orders_pending,
                (SELECT COUNT(*) FROM orders o
                  WHERE o.event_id IN (SELECT id FROM scoped_events)
                    AND o.status = 'approved')                          AS orders_approved,
                (SELECT COUNT(*) FROM orders o
                  WHERE o.event_id IN (SELECT id FROM scoped_events)
                    AND o.status = 'rejected')                          AS orders_rejected,
                (SELECT COUNT(*) FROM tickets t
                  WHERE t.event_id IN (SELECT id FROM scoped_events))   AS tickets_issued,
                (SELECT COUNT(*) FROM tickets t
                  WHERE t.event_id IN (SELECT id FROM scoped_events)
                    AND t.status = 'used')                              AS tickets_used,
                (SELECT COUNT(*) FROM scoped_events)                    AS events_total,
                (SELECT COUNT(*) FROM scoped_events
                  WHERE status = 'active')                              AS events_active
            "#,
        )
        .bind(company)
        .bind(owner)
        .fetch_one(pool)
        .await?;

        Ok(summary)
    }

    pub async fn customer_summary(pool: &PgPool, user_id: Uuid) -> Result<CustomerSummary, AppError> {
        let summary = sqlx::query_as::<_, CustomerSummary>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM orders
                  WHERE user_id = $1 AND status = 'pending')            AS orders_pending,
                (SELECT COUNT(*) FROM orders
                  WHERE user_id = $1 AND status = 'approved')           AS orders_approved,
                (SELECT COUNT(*) FROM orders
                  WHERE user_id = $1 AND status = 'rejected')           AS orders_rejected,
                (SELECT COALESCE(SUM(total_price), 0) FROM orders
                  WHERE user_id = $1 AND status = 'approved')           AS total_spent,
                (SELECT COUNT(*) FROM tickets
                  WHERE user_id = $1)                                   AS tickets_held,
                (SELECT COUNT(*) FROM tickets
                  WHERE user_id = $1 AND status = 'used')               AS tickets_used
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(summary)
    }
}
