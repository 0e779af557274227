use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::handlers::events::require_manager;
use crate::models::ticket_type::{NewTicketType, TicketType, TicketTypeChanges};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn create_ticket_type(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(new): Json<NewTicketType>,
) -> Result<Response, AppError> {
    require_manager(&state, event_id, &user).await?;

    let ticket_type = TicketType::create(&state.pool, event_id, new).await?;

    Ok(created(ticket_type, "Ticket type created"))
}

pub async fn list_ticket_types(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let ticket_types = TicketType::list_for_event(&state.pool, event_id).await?;

    Ok(success(ticket_types, "Ticket types retrieved"))
}

pub async fn update_ticket_type(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(changes): Json<TicketTypeChanges>,
) -> Result<Response, AppError> {
    let ticket_type = TicketType::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket type not found".to_string()))?;
    require_manager(&state, ticket_type.event_id, &user).await?;

    let ticket_type = TicketType::update(&state.pool, id, changes).await?;

    Ok(success(ticket_type, "Ticket type updated"))
}

pub async fn delete_ticket_type(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let ticket_type = TicketType::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket type not found".to_string()))?;
    require_manager(&state, ticket_type.event_id, &user).await?;

    TicketType::delete(&state.pool, id).await?;

    Ok(empty_success("Ticket type deleted"))
}
