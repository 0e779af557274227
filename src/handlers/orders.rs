use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::models::event::Event;
use crate::models::order::{Checkout, Order, OrderStatus};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<Checkout>,
) -> Result<Response, AppError> {
    let order = Order::checkout(&state.pool, user.id, request).await?;

    Ok(created(order, "Order submitted for review"))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
}

pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filters): Query<OrderFilters>,
) -> Result<Response, AppError> {
    let orders = Order::list(&state.pool, user.scope(), filters.status).await?;

    Ok(success(orders, "Orders retrieved"))
}

pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let order = Order::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.user_id != user.id && !Event::user_can_manage(&state.pool, order.event_id, &user).await? {
        return Err(AppError::Forbidden("You cannot view this order".to_string()));
    }

    Ok(success(order, "Order retrieved"))
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub status: OrderStatus,
}

/// The reviewer action. Approval mints tickets; the response carries
/// them so the reviewer UI can show what was issued.
pub async fn review_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewRequest>,
) -> Result<Response, AppError> {
    user.require_reviewer()?;

    let order = Order::find(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if !Event::user_can_manage(&state.pool, order.event_id, &user).await? {
        return Err(AppError::Forbidden(
            "You do not review orders for this event".to_string(),
        ));
    }

    let reviewed = Order::set_status(&state.pool, id, user.id, request.status).await?;

    Ok(success(reviewed, "Order reviewed"))
}
