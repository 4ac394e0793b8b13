use axum::http::header::{CONTENT_TYPE, WWW_AUTHENTICATE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use ferry_core::{KeyError, RegistryError};
use ferry_resolver::ResolveError;
use thiserror::Error;
use tracing::{debug, error};

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

pub const ADMIN_REALM: &str = "Basic realm=\"ferry admin\"";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Authentication required")]
    Unauthorized,
}

impl From<KeyError> for AppError {
    fn from(value: KeyError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Registry(error) => match error {
                RegistryError::Validation(_) => StatusCode::BAD_REQUEST,
                RegistryError::Conflict(_) => StatusCode::CONFLICT,
                RegistryError::NotFound(_) => StatusCode::NOT_FOUND,
                RegistryError::CorruptRecord { .. }
                | RegistryError::UnknownKind { .. }
                | RegistryError::CorruptIndex { .. }
                | RegistryError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Resolve(error) => match error {
                ResolveError::Upstream { status, .. } => *status,
                ResolveError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                ResolveError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                ResolveError::InvalidStoredUrl(_)
                | ResolveError::Network(_)
                | ResolveError::QrCode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// The message shown to clients.
    pub fn message(&self) -> String {
        match self {
            AppError::Registry(error) => match error {
                RegistryError::Validation(message) => message.clone(),
                RegistryError::Conflict(_) => {
                    "A mapping with this user ID and custom path already exists".to_string()
                }
                RegistryError::NotFound(_) => "Mapping not found".to_string(),
                RegistryError::CorruptRecord { .. } => "Invalid stored data format".to_string(),
                RegistryError::UnknownKind { .. } => "Invalid mapping type".to_string(),
                RegistryError::CorruptIndex { .. } => "Invalid mappings list format".to_string(),
                RegistryError::Store(source) => source.to_string(),
            },
            AppError::Resolve(ResolveError::InvalidStoredUrl(_)) => {
                "Invalid stored URL".to_string()
            }
            other => other.to_string(),
        }
    }

    fn log(&self, status: StatusCode) {
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "request rejected");
        }
    }

    fn with_challenge(&self, mut response: Response) -> Response {
        if matches!(self, AppError::Unauthorized) {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static(ADMIN_REALM));
        }
        response
    }
}

/// Renders as `{"error": "..."}`.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        self.log(status);
        let body = Json(ErrorResponse {
            error: self.message(),
        });
        self.with_challenge((status, body).into_response())
    }
}

/// An [`AppError`] rendered as a `text/plain` body, for routes that serve
/// content rather than JSON.
#[derive(Debug)]
pub struct PlainError(pub AppError);

impl<E> From<E> for PlainError
where
    E: Into<AppError>,
{
    fn from(error: E) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for PlainError {
    fn into_response(self) -> Response {
        let error = self.0;
        let status = error.status();
        error.log(status);
        let response = (
            status,
            [(CONTENT_TYPE, HeaderValue::from_static("text/plain"))],
            error.message(),
        )
            .into_response();
        error.with_challenge(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_core::StoreError;

    #[test]
    fn status_mapping() {
        let cases = [
            (
                AppError::from(RegistryError::Validation("bad".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(RegistryError::Conflict("k".into())),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(RegistryError::NotFound("k".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(RegistryError::UnknownKind {
                    key: "k".into(),
                    kind: "bogus".into(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::from(RegistryError::Store(StoreError::Timeout("t".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::from(ResolveError::upstream(StatusCode::BAD_GATEWAY)),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::from(ResolveError::GatewayTimeout("slow".into())),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                AppError::Configuration("missing".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
        ];

        for (error, status) in cases {
            assert_eq!(error.status(), status, "{error:?}");
        }
    }

    #[test]
    fn client_messages() {
        assert_eq!(
            AppError::from(RegistryError::UnknownKind {
                key: "k".into(),
                kind: "bogus".into()
            })
            .message(),
            "Invalid mapping type"
        );
        assert_eq!(
            AppError::from(ResolveError::upstream(StatusCode::NOT_FOUND)).message(),
            "Failed to fetch content: 404 Not Found"
        );
        assert_eq!(
            AppError::from(ResolveError::InvalidStoredUrl("x".into())).message(),
            "Invalid stored URL"
        );
    }

    #[test]
    fn unauthorized_carries_challenge() {
        let response = AppError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[WWW_AUTHENTICATE], ADMIN_REALM);
    }
}
