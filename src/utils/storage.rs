use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use crate::utils::error::AppError;

/// File names are `{unix_millis}-{user_id}.{ext}`; uploads are append-only
/// by construction and never overwritten.
pub async fn store_file(
    base_dir: &Path,
    kind: &str,
    user_id: Uuid,
    original_name: Option<&str>,
    bytes: &[u8],
) -> Result<String, AppError> {
    if bytes.is_empty() {
        return Err(AppError::ValidationError("Uploaded file is empty".to_string()));
    }

    let ext = extension_of(original_name);
    let file_name = format!("{}-{}.{}", Utc::now().timestamp_millis(), user_id, ext);

    let dir = base_dir.join(kind);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Could not create upload dir: {}", e)))?;

    tokio::fs::write(dir.join(&file_name), bytes)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Could not store upload: {}", e)))?;

    Ok(format!("/uploads/{}/{}", kind, file_name))
}

fn extension_of(original_name: Option<&str>) -> String {
    let ext = original_name
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext))
        .unwrap_or("bin");

    let ext: String = ext
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(10)
        .collect::<String>()
        .to_ascii_lowercase();

    if ext.is_empty() {
        "bin".to_string()
    } else {
        ext
    }
}
