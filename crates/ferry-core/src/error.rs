use thiserror::Error;

/// Errors raised by a key-value store backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),
    #[error("store operation timed out: {0}")]
    Timeout(String),
    #[error("store operation failed: {0}")]
    Operation(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
}

/// Errors produced while decoding or encoding a persisted mapping record.
#[derive(Debug, Clone, Error)]
pub enum RecordError {
    #[error("invalid stored data format: {0}")]
    Malformed(String),
    #[error("invalid mapping type: {0}")]
    UnknownKind(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("user id is required")]
    EmptyUserId,
    #[error("custom path is required")]
    EmptyCustomPath,
    #[error("user id must contain only alphanumeric characters, hyphens, or underscores: '{0}'")]
    InvalidUserId(String),
    #[error("malformed mapping key, expected user:{{userId}}:path:{{customPath}}: '{0}'")]
    Malformed(String),
}

/// Errors surfaced by the mapping registry.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(String),
    #[error("a mapping with this user ID and custom path already exists: {0}")]
    Conflict(String),
    #[error("mapping not found: {0}")]
    NotFound(String),
    #[error("corrupt record at '{key}': {reason}")]
    CorruptRecord { key: String, reason: String },
    #[error("invalid mapping type '{kind}' at '{key}'")]
    UnknownKind { key: String, kind: String },
    #[error("invalid mappings list format at '{key}': {reason}")]
    CorruptIndex { key: String, reason: String },
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<KeyError> for RegistryError {
    fn from(value: KeyError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl RegistryError {
    /// Attaches the mapping key a record failed to decode at.
    pub fn from_record(key: &str, error: RecordError) -> Self {
        match error {
            RecordError::Malformed(reason) => Self::CorruptRecord {
                key: key.to_string(),
                reason,
            },
            RecordError::UnknownKind(kind) => Self::UnknownKind {
                key: key.to_string(),
                kind,
            },
        }
    }
}
