use ferry_core::MappingKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /admin`, dispatched on its `action` field.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminRequest {
    /// `value` is a record object or a string holding one; the key decides
    /// `userId` and `customPath`.
    #[serde(rename_all = "camelCase")]
    Create {
        key: String,
        value: Value,
        #[serde(default, rename = "type")]
        kind: Option<MappingKind>,
    },
    #[serde(rename_all = "camelCase")]
    List {
        #[serde(default)]
        user_id: Option<String>,
    },
    Delete {
        key: String,
    },
    #[serde(rename_all = "camelCase")]
    DeleteAll {
        #[serde(default)]
        user_id: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateResponse {
    pub success: bool,
    pub mapping_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDeleteResponse {
    pub success: bool,
    pub mapping_key: String,
}

#[derive(Debug, Serialize)]
pub struct AdminDeleteAllResponse {
    pub success: bool,
    pub deleted: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_actions() {
        let create: AdminRequest = serde_json::from_value(json!({
            "action": "create",
            "key": "user:bob:path:a",
            "value": "{\"originalUrl\":\"https://example.com\"}",
            "type": "url_mapping",
        }))
        .unwrap();
        assert!(matches!(
            create,
            AdminRequest::Create { kind: Some(MappingKind::UrlMapping), .. }
        ));

        let list: AdminRequest =
            serde_json::from_value(json!({ "action": "list", "userId": "bob" })).unwrap();
        assert!(matches!(list, AdminRequest::List { user_id: Some(u) } if u == "bob"));

        let delete_all: AdminRequest =
            serde_json::from_value(json!({ "action": "delete_all" })).unwrap();
        assert!(matches!(delete_all, AdminRequest::DeleteAll { user_id: None }));
    }

    #[test]
    fn rejects_unknown_action() {
        let result = serde_json::from_value::<AdminRequest>(json!({ "action": "drop" }));
        assert!(result.is_err());
    }
}
