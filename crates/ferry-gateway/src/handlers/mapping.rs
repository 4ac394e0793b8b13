use crate::error::{AppError, Result};
use crate::model::{
    CreateTextMappingForm, CreateTextMappingResponse, CreateUrlMappingForm,
    CreateUrlMappingResponse, DeleteMappingResponse, ListMappingsResponse,
};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::{Form, Json};
use ferry_core::{MappingKey, MappingRecord, OwnerScope};
use jiff::Timestamp;
use tracing::info;

const DEFAULT_TEXT_FILENAME: &str = "text-content.txt";

fn required(value: Option<String>, message: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

pub async fn create_url_mapping_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CreateUrlMappingForm>,
) -> Result<Json<CreateUrlMappingResponse>> {
    let registry = state.registry()?;
    let original_url = required(form.original_url, "Original URL is required")?;
    let custom_path = required(form.custom_path, "Custom path is required")?;
    let user_id = state.user_id_or_default(form.user_id);

    let record = MappingRecord::url(&user_id, &custom_path, &original_url, Timestamp::now());
    let key = registry.create(record).await?;
    info!(key = %key, "created url mapping");

    Ok(Json(CreateUrlMappingResponse {
        success: true,
        mapped_url: state.mapped_url(&headers, &user_id, &custom_path),
        mapping_key: key.to_string(),
        user_id,
        custom_path,
        original_url,
        message: "User-defined mapping created successfully",
    }))
}

pub async fn create_text_mapping_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CreateTextMappingForm>,
) -> Result<Json<CreateTextMappingResponse>> {
    let registry = state.registry()?;
    let content = required(form.content, "Content is required")?;
    let custom_path = required(form.custom_path, "Custom path is required")?;
    let filename = form
        .filename
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_TEXT_FILENAME.to_string());
    let user_id = state.user_id_or_default(form.user_id);

    let record = MappingRecord::text(
        &user_id,
        &custom_path,
        content,
        filename.clone(),
        Timestamp::now(),
    );
    let content_type = record.content_type().unwrap_or_default().to_string();
    let key = registry.create(record).await?;
    info!(key = %key, "created text mapping");

    let mapped_url = state.mapped_url(&headers, &user_id, &custom_path);
    Ok(Json(CreateTextMappingResponse {
        success: true,
        persistent_url: mapped_url.clone(),
        mapped_url,
        mapping_key: key.to_string(),
        user_id,
        custom_path,
        filename,
        content_type,
        message: "User-defined text content mapping created successfully",
    }))
}

pub async fn list_user_mappings_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ListMappingsResponse>> {
    let listed = state
        .registry()?
        .list(&OwnerScope::user(user_id.clone()))
        .await?;
    Ok(Json(ListMappingsResponse::new(Some(user_id), listed)))
}

pub async fn list_all_mappings_handler(
    State(state): State<AppState>,
) -> Result<Json<ListMappingsResponse>> {
    let listed = state.registry()?.list(&OwnerScope::Global).await?;
    Ok(Json(ListMappingsResponse::new(None, listed)))
}

pub async fn delete_mapping_handler(
    State(state): State<AppState>,
    Path((user_id, custom_path)): Path<(String, String)>,
) -> Result<Json<DeleteMappingResponse>> {
    state.registry()?.delete(&user_id, &custom_path).await?;
    info!(user_id = %user_id, custom_path = %custom_path, "deleted mapping");

    Ok(Json(DeleteMappingResponse {
        success: true,
        mapping_key: MappingKey::encode(&user_id, &custom_path).to_string(),
        message: "Mapping deleted successfully",
    }))
}
