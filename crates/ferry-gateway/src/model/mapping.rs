use ferry_core::{ListedMapping, MappingKind, MappingPayload};
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

const PREVIEW_CHARS: usize = 100;
const UNDECODABLE_RECORD: &str = "Could not retrieve detailed information";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlMappingForm {
    pub original_url: Option<String>,
    pub custom_path: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTextMappingForm {
    pub content: Option<String>,
    pub filename: Option<String>,
    pub custom_path: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlMappingResponse {
    pub success: bool,
    pub mapped_url: String,
    pub mapping_key: String,
    pub user_id: String,
    pub custom_path: String,
    pub original_url: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTextMappingResponse {
    pub success: bool,
    pub mapped_url: String,
    pub persistent_url: String,
    pub mapping_key: String,
    pub user_id: String,
    pub custom_path: String,
    pub filename: String,
    pub content_type: String,
    pub message: &'static str,
}

/// One row of a listing response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingView {
    pub mapping_key: String,
    pub custom_path: String,
    pub created_at: Timestamp,
    #[serde(rename = "type")]
    pub kind: MappingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

fn preview(content: &str) -> String {
    match content.char_indices().nth(PREVIEW_CHARS) {
        Some((end, _)) => format!("{}...", &content[..end]),
        None => content.to_string(),
    }
}

impl From<ListedMapping> for MappingView {
    fn from(listed: ListedMapping) -> Self {
        let ListedMapping { entry, record } = listed;
        let mut view = MappingView {
            mapping_key: entry.mapping_key.to_string(),
            custom_path: entry.custom_path,
            created_at: entry.created_at,
            kind: entry.kind,
            original_url: None,
            content_preview: None,
            filename: None,
            content_type: None,
            error: None,
        };

        match record.map(|record| record.payload) {
            Some(MappingPayload::UrlMapping { original_url }) => {
                view.original_url = Some(original_url);
            }
            Some(MappingPayload::TextContent {
                content,
                filename,
                content_type,
            }) => {
                view.content_preview = Some(preview(&content));
                view.filename = Some(filename);
                view.content_type = Some(content_type);
            }
            None => view.error = Some(UNDECODABLE_RECORD),
        }
        view
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMappingsResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub count: usize,
    pub mappings: Vec<MappingView>,
    pub message: String,
}

impl ListMappingsResponse {
    pub fn new(user_id: Option<String>, listed: Vec<ListedMapping>) -> Self {
        let mappings: Vec<MappingView> = listed.into_iter().map(MappingView::from).collect();
        let count = mappings.len();
        let message = match &user_id {
            Some(user_id) => format!("Retrieved {count} mappings for user {user_id}"),
            None => format!("Retrieved {count} mappings"),
        };
        Self {
            success: true,
            user_id,
            count,
            mappings,
            message,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMappingResponse {
    pub success: bool,
    pub mapping_key: String,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::{IndexEntry, MappingRecord};

    fn ts() -> Timestamp {
        "2024-05-01T10:00:00Z".parse().unwrap()
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        assert_eq!(preview("short"), "short");
        let exact = "a".repeat(100);
        assert_eq!(preview(&exact), exact);

        let long = "é".repeat(150);
        let truncated = preview(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 103);
    }

    #[test]
    fn text_view_shape() {
        let record = MappingRecord::text("bob", "n", "hello", "note.txt", ts());
        let listed = ListedMapping {
            entry: IndexEntry::for_record(&record),
            record: Some(record),
        };

        let value = serde_json::to_value(MappingView::from(listed)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "mappingKey": "user:bob:path:n",
                "customPath": "n",
                "createdAt": "2024-05-01T10:00:00Z",
                "type": "text_content",
                "contentPreview": "hello",
                "filename": "note.txt",
                "contentType": "text/plain",
            })
        );
    }

    #[test]
    fn undecodable_record_view() {
        let record = MappingRecord::url("bob", "a", "https://example.com", ts());
        let listed = ListedMapping {
            entry: IndexEntry::for_record(&record),
            record: None,
        };

        let view = MappingView::from(listed);
        assert_eq!(view.error, Some(UNDECODABLE_RECORD));
        assert!(view.original_url.is_none());
    }
}
