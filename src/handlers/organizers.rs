use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::handlers::events::require_manager;
use crate::models::organizer::{EventOrganizer, OrganizerRole};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, success};

#[derive(Debug, Deserialize)]
pub struct GrantRequest {
    pub user_id: Uuid,
    pub role: OrganizerRole,
}

pub async fn grant_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
    Json(request): Json<GrantRequest>,
) -> Result<Response, AppError> {
    require_manager(&state, event_id, &user).await?;

    let organizer =
        EventOrganizer::upsert(&state.pool, event_id, request.user_id, request.role).await?;

    Ok(success(organizer, "Organizer role granted"))
}

pub async fn list_organizers(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    require_manager(&state, event_id, &user).await?;

    let organizers = EventOrganizer::list_for_event(&state.pool, event_id).await?;

    Ok(success(organizers, "Organizers retrieved"))
}

pub async fn revoke_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((event_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, AppError> {
    require_manager(&state, event_id, &user).await?;

    EventOrganizer::remove(&state.pool, event_id, user_id).await?;

    Ok(empty_success("Organizer role revoked"))
}
