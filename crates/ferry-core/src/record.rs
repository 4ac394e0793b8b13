use crate::content_type::infer_content_type;
use crate::error::RecordError;
use crate::key::MappingKey;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

const TYPE_FIELD: &str = "type";
const URL_MAPPING_TAG: &str = "url_mapping";
const TEXT_CONTENT_TAG: &str = "text_content";

/// The kind tag persisted in the `type` field of records and index entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    UrlMapping,
    TextContent,
}

impl MappingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingKind::UrlMapping => URL_MAPPING_TAG,
            MappingKind::TextContent => TEXT_CONTENT_TAG,
        }
    }
}

impl Display for MappingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific part of a [`MappingRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MappingPayload {
    /// Content is fetched from `original_url` on every resolution.
    #[serde(rename_all = "camelCase")]
    UrlMapping { original_url: String },
    /// Content is stored inline and served verbatim.
    #[serde(rename_all = "camelCase")]
    TextContent {
        content: String,
        filename: String,
        content_type: String,
    },
}

/// A mapping persisted as JSON under its [`MappingKey`].
///
/// The JSON shape is a wire contract with already stored data:
///
/// ```json
/// { "type": "url_mapping" | "text_content",
///   "userId": "...", "customPath": "...", "createdAt": "2024-01-01T00:00:00Z",
///   "originalUrl": "...",
///   "content": "...", "filename": "...", "contentType": "..." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    pub user_id: String,
    pub custom_path: String,
    pub created_at: Timestamp,
    #[serde(flatten)]
    pub payload: MappingPayload,
}

impl MappingRecord {
    /// Creates a URL-redirect record.
    pub fn url(
        user_id: impl Into<String>,
        custom_path: impl Into<String>,
        original_url: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            custom_path: custom_path.into(),
            created_at,
            payload: MappingPayload::UrlMapping {
                original_url: original_url.into(),
            },
        }
    }

    /// Creates a text-content record, deriving its content type from `filename`.
    pub fn text(
        user_id: impl Into<String>,
        custom_path: impl Into<String>,
        content: impl Into<String>,
        filename: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        let filename = filename.into();
        let content_type = infer_content_type(&filename).to_string();
        Self {
            user_id: user_id.into(),
            custom_path: custom_path.into(),
            created_at,
            payload: MappingPayload::TextContent {
                content: content.into(),
                filename,
                content_type,
            },
        }
    }

    /// The stored `Content-Type` of a text record.
    pub fn content_type(&self) -> Option<&str> {
        match &self.payload {
            MappingPayload::TextContent { content_type, .. } => Some(content_type),
            MappingPayload::UrlMapping { .. } => None,
        }
    }

    pub fn kind(&self) -> MappingKind {
        match self.payload {
            MappingPayload::UrlMapping { .. } => MappingKind::UrlMapping,
            MappingPayload::TextContent { .. } => MappingKind::TextContent,
        }
    }

    /// The key this record is stored under, built without validation.
    pub fn key(&self) -> MappingKey {
        MappingKey::encode(&self.user_id, &self.custom_path)
    }

    /// Decodes a stored record.
    ///
    /// An unrecognised `type` tag is reported as [`RecordError::UnknownKind`]
    /// so it can be told apart from bytes that are not a record at all.
    /// Legacy records without a `type` tag but with an `originalUrl` are read
    /// as URL mappings.
    pub fn from_json(raw: &str) -> Result<Self, RecordError> {
        let mut value: Value =
            serde_json::from_str(raw).map_err(|e| RecordError::Malformed(e.to_string()))?;

        let Some(object) = value.as_object_mut() else {
            return Err(RecordError::Malformed(
                "expected a JSON object".to_string(),
            ));
        };

        match object.get(TYPE_FIELD) {
            Some(Value::String(tag)) if tag == URL_MAPPING_TAG || tag == TEXT_CONTENT_TAG => {}
            Some(Value::String(tag)) => return Err(RecordError::UnknownKind(tag.clone())),
            Some(other) => return Err(RecordError::UnknownKind(other.to_string())),
            None if object.contains_key("originalUrl") => {
                object.insert(
                    TYPE_FIELD.to_string(),
                    Value::String(URL_MAPPING_TAG.to_string()),
                );
            }
            None => return Err(RecordError::UnknownKind("<missing>".to_string())),
        }

        serde_json::from_value(value).map_err(|e| RecordError::Malformed(e.to_string()))
    }

    /// Encodes the record into its persisted JSON form.
    pub fn to_json(&self) -> Result<String, RecordError> {
        serde_json::to_string(self).map_err(|e| RecordError::Malformed(e.to_string()))
    }
}
