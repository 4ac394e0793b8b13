use crate::error::PlainError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct GistQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QrCodeQuery {
    pub url: Option<String>,
}

pub async fn gist_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<GistQuery>,
) -> Result<Response, PlainError> {
    Ok(state.gist().fetch(&path, query.filename.as_deref()).await?)
}

pub async fn qrcode_handler(
    State(state): State<AppState>,
    Query(query): Query<QrCodeQuery>,
) -> Result<Response, PlainError> {
    let url = query.url.unwrap_or_default();
    Ok(state.qrcode().generate(&url).await?)
}
