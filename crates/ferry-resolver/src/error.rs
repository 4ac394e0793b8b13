use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Invalid stored URL: {0}")]
    InvalidStoredUrl(String),
    #[error("Failed to fetch content: {} {reason}", .status.as_u16())]
    Upstream { status: StatusCode, reason: String },
    #[error("Failed to fetch content: {0}")]
    Network(String),
    #[error("Upstream request timed out: {0}")]
    GatewayTimeout(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Error generating QR code")]
    QrCode(String),
}

impl ResolveError {
    /// Builds an [`ResolveError::Upstream`] carrying the status's canonical reason.
    pub fn upstream(status: StatusCode) -> Self {
        Self::Upstream {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
