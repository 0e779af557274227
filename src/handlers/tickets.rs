use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::event::Event;
use crate::models::ticket::{GenerateTickets, Ticket, ValidationOutcome};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Default, Deserialize)]
pub struct TicketFilters {
    pub event_id: Option<Uuid>,
}

pub async fn list_tickets(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filters): Query<TicketFilters>,
) -> Result<Response, AppError> {
    let tickets = Ticket::list(&state.pool, user.scope(), filters.event_id).await?;

    Ok(success(tickets, "Tickets retrieved"))
}

/// Admin-only manual issuance for comped and guest tickets; bypasses
/// orders and inventory entirely.
pub async fn generate_tickets(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<GenerateTickets>,
) -> Result<Response, AppError> {
    user.require_admin()?;

    let tickets = Ticket::generate(&state.pool, request).await?;

    Ok(created(tickets, "Tickets generated"))
}

/// Check-in scan. Every outcome, including an already-used or unknown
/// ticket, is an HTTP 200; the gate UI distinguishes them by the
/// `result` tag.
pub async fn validate_ticket(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    user.require_reviewer()?;

    if let Some(ticket) = Ticket::find(&state.pool, id).await? {
        if !Event::user_can_validate(&state.pool, ticket.event_id, &user).await? {
            return Err(AppError::Forbidden(
                "You do not validate tickets for this event".to_string(),
            ));
        }
    }

    let outcome = Ticket::redeem(&state.pool, id).await?;

    let message = match &outcome {
        ValidationOutcome::AccessGranted { .. } => "Access granted",
        ValidationOutcome::AlreadyUsed { .. } => "Ticket already used",
        ValidationOutcome::TicketNotFound => "Ticket not found",
        ValidationOutcome::InvalidTicket => "Ticket is not valid",
    };

    Ok(success(outcome, message))
}
