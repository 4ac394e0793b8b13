use crate::error::{AppError, Result};
use crate::model::{
    AdminCreateResponse, AdminDeleteAllResponse, AdminDeleteResponse, AdminRequest,
    ListMappingsResponse,
};
use crate::state::{AdminCredentials, AppState};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ferry_core::{
    infer_content_type, MappingKey, MappingKind, MappingRecord, OwnerScope, Registry,
};
use jiff::Timestamp;
use serde_json::{Map, Value};
use tracing::{debug, info};

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

fn authorize(expected: Option<&AdminCredentials>, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    match basic_credentials(headers) {
        Some((username, password))
            if username == expected.username && password == expected.password =>
        {
            Ok(())
        }
        _ => {
            debug!("admin request without valid credentials");
            Err(AppError::Unauthorized)
        }
    }
}

fn scope(user_id: Option<String>) -> OwnerScope {
    match user_id.filter(|id| !id.is_empty()) {
        Some(user_id) => OwnerScope::User(user_id),
        None => OwnerScope::Global,
    }
}

/// Builds a record from an admin-supplied value, taking `userId` and
/// `customPath` from the key.
fn admin_record(key: &MappingKey, value: Value, kind: Option<MappingKind>) -> Result<MappingRecord> {
    let value = match value {
        Value::String(raw) => serde_json::from_str(&raw)
            .map_err(|e| AppError::Validation(format!("value is not valid JSON: {e}")))?,
        other => other,
    };
    let Value::Object(mut object) = value else {
        return Err(AppError::Validation(
            "value must be a JSON object".to_string(),
        ));
    };
    let Some((user_id, custom_path)) = key.decode() else {
        return Err(AppError::Validation(format!("malformed mapping key: {key}")));
    };

    object.insert("userId".to_string(), Value::from(user_id));
    object.insert("customPath".to_string(), Value::from(custom_path));
    object
        .entry("createdAt")
        .or_insert_with(|| Value::from(Timestamp::now().to_string()));
    if let Some(kind) = kind {
        object
            .entry("type")
            .or_insert_with(|| Value::from(kind.as_str()));
    }
    fill_content_type(&mut object);

    MappingRecord::from_json(&Value::Object(object).to_string())
        .map_err(|e| AppError::Validation(e.to_string()))
}

fn fill_content_type(object: &mut Map<String, Value>) {
    let is_text = object.get("type").and_then(Value::as_str) == Some(MappingKind::TextContent.as_str());
    if !is_text || object.contains_key("contentType") {
        return;
    }
    let filename = object
        .get("filename")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let content_type = infer_content_type(filename);
    object.insert("contentType".to_string(), Value::from(content_type));
}

pub async fn admin_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    authorize(state.admin_credentials(), &headers)?;
    let registry = state.registry()?;

    let request: AdminRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid admin request: {e}")))?;

    match request {
        AdminRequest::Create { key, value, kind } => create(registry, key, value, kind).await,
        AdminRequest::List { user_id } => {
            let scope = scope(user_id);
            let listed = registry.list(&scope).await?;
            let user_id = match scope {
                OwnerScope::User(user_id) => Some(user_id),
                OwnerScope::Global => None,
            };
            Ok(Json(ListMappingsResponse::new(user_id, listed)).into_response())
        }
        AdminRequest::Delete { key } => {
            let key = MappingKey::parse(key)?;
            let Some((user_id, custom_path)) = key.decode() else {
                return Err(AppError::Validation(format!("malformed mapping key: {key}")));
            };
            registry.delete(user_id, custom_path).await?;
            info!(key = %key, "admin deleted mapping");
            Ok(Json(AdminDeleteResponse {
                success: true,
                mapping_key: key.to_string(),
            })
            .into_response())
        }
        AdminRequest::DeleteAll { user_id } => {
            let scope = scope(user_id);
            let deleted = registry.delete_all(&scope).await?;
            info!(scope = %scope, deleted, "admin deleted all mappings");
            Ok(Json(AdminDeleteAllResponse {
                success: true,
                deleted,
            })
            .into_response())
        }
    }
}

async fn create(
    registry: &dyn Registry,
    key: String,
    value: Value,
    kind: Option<MappingKind>,
) -> Result<Response> {
    let key = MappingKey::parse(key)?;
    let record = admin_record(&key, value, kind)?;
    let key = registry.create(record).await?;
    info!(key = %key, "admin created mapping");

    Ok(Json(AdminCreateResponse {
        success: true,
        mapping_key: key.to_string(),
    })
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use ferry_core::MappingPayload;
    use serde_json::json;

    fn credentials() -> AdminCredentials {
        AdminCredentials {
            username: "admin".to_string(),
            password: "s3cret".to_string(),
        }
    }

    fn basic(user_pass: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let value = format!("Basic {}", STANDARD.encode(user_pass));
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&value).unwrap());
        headers
    }

    #[test]
    fn open_when_no_credentials_configured() {
        assert!(authorize(None, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn basic_auth_gate() {
        let expected = credentials();
        assert!(authorize(Some(&expected), &basic("admin:s3cret")).is_ok());
        assert!(matches!(
            authorize(Some(&expected), &basic("admin:wrong")),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            authorize(Some(&expected), &HeaderMap::new()),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn record_from_string_value_takes_identity_from_key() {
        let key = MappingKey::parse("user:bob:path:docs/a.json").unwrap();
        let value = json!("{\"originalUrl\":\"https://example.com/a.json\",\"userId\":\"mallory\"}");

        let record = admin_record(&key, value, Some(MappingKind::UrlMapping)).unwrap();

        assert_eq!(record.user_id, "bob");
        assert_eq!(record.custom_path, "docs/a.json");
        assert_eq!(
            record.payload,
            MappingPayload::UrlMapping {
                original_url: "https://example.com/a.json".to_string()
            }
        );
    }

    #[test]
    fn text_record_gets_inferred_content_type() {
        let key = MappingKey::parse("user:bob:path:n").unwrap();
        let value = json!({ "content": "{}", "filename": "n.json" });

        let record = admin_record(&key, value, Some(MappingKind::TextContent)).unwrap();

        let MappingPayload::TextContent { content_type, .. } = record.payload else {
            panic!("expected text content");
        };
        assert_eq!(content_type, "application/json");
    }

    #[test]
    fn non_object_value_is_rejected() {
        let key = MappingKey::parse("user:bob:path:n").unwrap();
        assert!(matches!(
            admin_record(&key, json!([1, 2]), None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            admin_record(&key, json!({ "content": "x" }), None),
            Err(AppError::Validation(_))
        ));
    }
}
