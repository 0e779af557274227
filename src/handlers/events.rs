use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::models::event::{Event, EventChanges, EventFilters, NewEvent};
use crate::models::ticket_type::TicketType;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(new): Json<NewEvent>,
) -> Result<Response, AppError> {
    user.require_role(&[Role::Admin, Role::Organizer])?;

    let event = Event::create(&state.pool, &user, new).await?;

    Ok(created(event, "Event created"))
}

/// Without a staff identity this is the public catalogue (active events
/// only); with one it is the scoped management listing.
pub async fn list_events(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(filters): Query<EventFilters>,
) -> Result<Response, AppError> {
    let events = match user {
        Some(user) if user.is_reviewer() => {
            Event::list(&state.pool, user.scope(), &filters).await?
        }
        _ => Event::list_public(&state.pool, &filters).await?,
    };

    Ok(success(events, "Events retrieved"))
}

#[derive(Serialize)]
struct EventDetail {
    #[serde(flatten)]
    event: Event,
    ticket_types: Vec<TicketType>,
}

/// Looks the event up by id or by slug, whichever the key parses as.
pub async fn get_event(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let event = match key.parse::<Uuid>() {
        Ok(id) => Event::find(&state.pool, id).await?,
        Err(_) => Event::find_by_slug(&state.pool, &key).await?,
    }
    .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let ticket_types = TicketType::list_for_event(&state.pool, event.id).await?;

    Ok(success(EventDetail { event, ticket_types }, "Event retrieved"))
}

pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(changes): Json<EventChanges>,
) -> Result<Response, AppError> {
    require_manager(&state, id, &user).await?;

    let event = Event::update(&state.pool, id, changes).await?;

    Ok(success(event, "Event updated"))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    require_manager(&state, id, &user).await?;

    Event::delete(&state.pool, id).await?;

    Ok(empty_success("Event deleted"))
}

pub(crate) async fn require_manager(
    state: &AppState,
    event_id: Uuid,
    user: &AuthUser,
) -> Result<(), AppError> {
    if Event::user_can_manage(&state.pool, event_id, user).await? {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not manage this event".to_string(),
        ))
    }
}
