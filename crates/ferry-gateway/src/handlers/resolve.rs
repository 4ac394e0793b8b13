use crate::error::{AppError, PlainError};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::Response;
use tracing::trace;

pub async fn resolve_mapping_handler(
    State(state): State<AppState>,
    Path((user_id, custom_path)): Path<(String, String)>,
) -> Result<Response, PlainError> {
    trace!(user_id = %user_id, custom_path = %custom_path, "resolve request");

    let registry = state.registry()?;
    let record = registry
        .get(&user_id, &custom_path)
        .await?
        .ok_or_else(|| AppError::NotFound("Mapping not found".to_string()))?;

    Ok(state.resolver().resolve(&record).await?)
}

/// `/m/{userId}` without a custom path.
pub async fn incomplete_resolve_path_handler() -> PlainError {
    PlainError(AppError::Validation(
        "Invalid path format. Expected /m/{userId}/{customPath}".to_string(),
    ))
}
