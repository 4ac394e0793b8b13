use crate::error::KeyError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

const USER_PREFIX: &str = "user:";
const PATH_DELIMITER: &str = ":path:";

/// The storage key of a mapping: `user:{userId}:path:{customPath}`.
///
/// Keys are derived on every request and never cached. The codec performs no
/// normalization; callers supply exact values. `userId` must not contain `:`
/// because [`MappingKey::decode`] takes the user id up to the first `:` after
/// the `user:` prefix. `customPath` may contain `/` and `:`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingKey(String);

impl MappingKey {
    /// Creates a key after validating both components.
    ///
    /// `user_id` must be non-empty and contain only `[a-zA-Z0-9_-]`;
    /// `custom_path` must be non-empty.
    pub fn new(user_id: &str, custom_path: &str) -> Result<Self, KeyError> {
        validate_user_id(user_id)?;
        if custom_path.is_empty() {
            return Err(KeyError::EmptyCustomPath);
        }
        Ok(Self::encode(user_id, custom_path))
    }

    /// Builds a key by plain concatenation, without validation.
    ///
    /// Used for lookups driven by request paths: an odd user id simply
    /// produces a key that is never found.
    pub fn encode(user_id: &str, custom_path: &str) -> Self {
        Self(format!("{USER_PREFIX}{user_id}{PATH_DELIMITER}{custom_path}"))
    }

    /// Parses a raw key string, accepting only well-formed keys.
    pub fn parse(raw: impl Into<String>) -> Result<Self, KeyError> {
        let raw = raw.into();
        if !is_well_formed(&raw) {
            return Err(KeyError::Malformed(raw));
        }
        Ok(Self(raw))
    }

    /// Splits the key back into `(user_id, custom_path)`.
    ///
    /// Returns `None` when the key lacks the `user:` prefix or the `:path:`
    /// delimiter.
    pub fn decode(&self) -> Option<(&str, &str)> {
        decode(&self.0)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.decode().map(|(user_id, _)| user_id)
    }

    pub fn custom_path(&self) -> Option<&str> {
        self.decode().map(|(_, custom_path)| custom_path)
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MappingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MappingKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Splits a raw key into `(user_id, custom_path)`.
///
/// The user id is the text between `user:` and the first `:` after it; the
/// custom path is everything after the first `:path:`. A user id containing
/// `:` is therefore truncated.
pub fn decode(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix(USER_PREFIX)?;
    let (_, custom_path) = rest.split_once(PATH_DELIMITER)?;
    let user_id = rest.split(':').next().unwrap_or_default();
    Some((user_id, custom_path))
}

/// Checks the pattern `user:[a-zA-Z0-9_-]+:path:.+`.
pub fn is_well_formed(key: &str) -> bool {
    let Some(rest) = key.strip_prefix(USER_PREFIX) else {
        return false;
    };
    let Some((user_id, custom_path)) = rest.split_once(PATH_DELIMITER) else {
        return false;
    };
    !user_id.is_empty() && user_id.chars().all(is_user_id_char) && !custom_path.is_empty()
}

/// Checks `user_id` is non-empty and contains only `[a-zA-Z0-9_-]`.
pub fn validate_user_id(user_id: &str) -> Result<(), KeyError> {
    if user_id.is_empty() {
        return Err(KeyError::EmptyUserId);
    }
    if !user_id.chars().all(is_user_id_char) {
        return Err(KeyError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}

fn is_user_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_format() {
        let key = MappingKey::encode("bob", "a");
        assert_eq!(key.as_str(), "user:bob:path:a");
    }

    #[test]
    fn round_trip() {
        for (user_id, custom_path) in [
            ("bob", "a"),
            ("user_1-x", "docs/config.json"),
            ("u", "weird:path:inside"),
        ] {
            let key = MappingKey::new(user_id, custom_path).unwrap();
            assert_eq!(key.decode(), Some((user_id, custom_path)));
        }
    }

    #[test]
    fn user_id_with_colon_is_truncated_on_decode() {
        let key = MappingKey::encode("team:bob", "a");
        assert_eq!(key.user_id(), Some("team"));
    }

    #[test]
    fn new_rejects_bad_components() {
        assert_eq!(MappingKey::new("", "a"), Err(KeyError::EmptyUserId));
        assert_eq!(MappingKey::new("bob", ""), Err(KeyError::EmptyCustomPath));
        assert!(matches!(
            MappingKey::new("bo b", "a"),
            Err(KeyError::InvalidUserId(_))
        ));
        assert!(matches!(
            MappingKey::new("team:bob", "a"),
            Err(KeyError::InvalidUserId(_))
        ));
    }

    #[test]
    fn user_id_validation() {
        assert!(validate_user_id("bob_1-x").is_ok());
        assert_eq!(validate_user_id(""), Err(KeyError::EmptyUserId));
        assert!(matches!(
            validate_user_id("bob:path:x"),
            Err(KeyError::InvalidUserId(_))
        ));
    }

    #[test]
    fn well_formed_pattern() {
        assert!(is_well_formed("user:bob:path:a"));
        assert!(is_well_formed("user:bob_1-2:path:nested/file.txt"));
        assert!(!is_well_formed("user::path:a"));
        assert!(!is_well_formed("user:bob:path:"));
        assert!(!is_well_formed("user:bob:mappings:list"));
        assert!(!is_well_formed("mappings:list"));
        assert!(!is_well_formed("bob:path:a"));
        assert!(!is_well_formed("user:b.ob:path:a"));
    }

    #[test]
    fn parse_accepts_only_well_formed() {
        let key = MappingKey::parse("user:bob:path:a").unwrap();
        assert_eq!(key.decode(), Some(("bob", "a")));
        assert!(matches!(
            MappingKey::parse("user:bob"),
            Err(KeyError::Malformed(_))
        ));
    }

    #[test]
    fn decode_rejects_foreign_keys() {
        assert_eq!(decode("mappings:list"), None);
        assert_eq!(decode("user:bob:mappings:list"), None);
    }
}
