use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::auth::{AuthUser, Role};
use crate::models::user::{SyncProfile, User, UserRole};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Mirrors the identity provider's account into the local users table so
/// orders and tickets have a row to reference. Called by the frontend
/// after sign-in.
pub async fn sync_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Json(profile): Json<SyncProfile>,
) -> Result<Response, AppError> {
    let role = match user.role {
        Role::Admin => UserRole::Admin,
        Role::Organizer => UserRole::Organizer,
        Role::Validator => UserRole::Validator,
        Role::Customer => UserRole::Customer,
    };

    let synced = User::sync(&state.pool, user.id, role, user.company_id, &profile).await?;

    Ok(success(synced, "Profile synchronized"))
}
