use axum::extract::{Multipart, State};
use axum::response::Response;
use serde_json::json;

use crate::auth::{AuthUser, Role};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::created;
use crate::utils::storage::store_file;

/// Payment receipts, uploaded by customers before checkout. The stored
/// path is carried on the order and shown to reviewers.
pub async fn upload_receipt(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    store_upload(&state, &user, multipart, "receipts").await
}

/// Event cover images, uploaded by staff.
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    user.require_role(&[Role::Admin, Role::Organizer])?;

    store_upload(&state, &user, multipart, "images").await
}

async fn store_upload(
    state: &AppState,
    user: &AuthUser,
    mut multipart: Multipart,
    kind: &str,
) -> Result<Response, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::ValidationError(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().map(|s| s.to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::ValidationError(format!("Could not read upload: {}", e)))?;

        let path = store_file(
            &state.config.upload_dir,
            kind,
            user.id,
            original_name.as_deref(),
            &bytes,
        )
        .await?;

        return Ok(created(json!({ "url": path }), "File uploaded"));
    }

    Err(AppError::ValidationError(
        "Multipart field 'file' is required".to_string(),
    ))
}
