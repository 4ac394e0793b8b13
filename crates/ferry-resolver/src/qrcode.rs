use crate::error::{ResolveError, Result};
use crate::headers::ONE_HOUR_PUBLIC_CACHE;
use crate::upstream::Upstream;
use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;
use std::sync::Arc;
use tracing::{trace, warn};
use url::Url;

const QR_SIZE: &str = "300x300";

/// Renders QR codes by delegating to an external image API.
#[derive(Clone)]
pub struct QrCodeGenerator {
    upstream: Arc<dyn Upstream>,
    service_url: String,
}

impl QrCodeGenerator {
    pub fn new(upstream: Arc<dyn Upstream>, service_url: impl Into<String>) -> Self {
        Self {
            upstream,
            service_url: service_url.into(),
        }
    }

    /// Returns a PNG encoding `data`, which must be an absolute URL.
    pub async fn generate(&self, data: &str) -> Result<Response> {
        if data.is_empty() {
            return Err(ResolveError::InvalidRequest(
                "URL parameter is required".to_string(),
            ));
        }
        Url::parse(data)
            .map_err(|_| ResolveError::InvalidRequest("Invalid URL format".to_string()))?;

        let mut target = Url::parse(&self.service_url)
            .map_err(|e| ResolveError::QrCode(format!("invalid QR service url: {e}")))?;
        target
            .query_pairs_mut()
            .append_pair("size", QR_SIZE)
            .append_pair("data", data);
        trace!(url = %target, "requesting QR code");

        let upstream = self.upstream.fetch(&target).await.map_err(|e| {
            warn!(error = %e, "QR code service request failed");
            ResolveError::QrCode(e.to_string())
        })?;
        if !upstream.status.is_success() {
            warn!(status = upstream.status.as_u16(), "QR code service returned an error status");
            return Err(ResolveError::QrCode(format!(
                "QR code service responded {}",
                upstream.status
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("image/png"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(ONE_HOUR_PUBLIC_CACHE));
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

        let mut response = Response::new(upstream.body);
        *response.status_mut() = StatusCode::OK;
        *response.headers_mut() = headers;
        Ok(response)
    }
}
