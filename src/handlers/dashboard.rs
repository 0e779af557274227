use axum::extract::State;
use axum::response::Response;

use crate::auth::{AuthUser, Role};
use crate::models::reports::Reports;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Role-based dashboard rollups: staff get the event summary shaped by
/// their access scope, customers get their own purchase history.
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    if user.role == Role::Customer {
        let summary = Reports::customer_summary(&state.pool, user.id).await?;
        return Ok(success(summary, "Dashboard summary retrieved"));
    }

    let summary = Reports::event_summary(&state.pool, user.scope()).await?;

    Ok(success(summary, "Dashboard summary retrieved"))
}
