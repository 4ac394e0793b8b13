use crate::error::{ResolveError, Result};
use crate::headers::{attachment, ONE_HOUR_PUBLIC_CACHE};
use crate::upstream::Upstream;
use axum::body::Body;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use ferry_core::content_type::DEFAULT_CONTENT_TYPE;
use std::sync::Arc;
use tracing::{debug, trace};
use url::Url;

const PROXY_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-proxy-source");
const PROXY_SOURCE: &str = "ferry-gist-proxy";
const FALLBACK_FILENAME: &str = "download";

/// Proxies raw gist files as downloads.
///
/// Paths take the form `{user}/{gistId}/raw/{file...}` and are appended to
/// the configured raw host.
#[derive(Clone)]
pub struct GistProxy {
    upstream: Arc<dyn Upstream>,
    base_url: String,
}

impl GistProxy {
    pub fn new(upstream: Arc<dyn Upstream>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            upstream,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn target(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        if path.split('/').filter(|s| !s.is_empty()).count() < 4 {
            return Err(ResolveError::InvalidRequest(
                "Invalid gist path. Expected /gist/{user}/{gistId}/raw/{file}".to_string(),
            ));
        }
        Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| ResolveError::InvalidRequest(format!("Invalid gist path: {e}")))
    }

    /// Fetches `path` and serves it as an attachment named `filename`, or
    /// the path's last segment when no name is given.
    ///
    /// A non-success upstream status is passed through as a plain-text
    /// response rather than an error.
    pub async fn fetch(&self, path: &str, filename: Option<&str>) -> Result<Response> {
        let target = self.target(path)?;
        trace!(url = %target, "proxying gist file");

        let upstream = self.upstream.fetch(&target).await?;
        if !upstream.status.is_success() {
            debug!(url = %target, status = upstream.status.as_u16(), "Gist upstream returned an error status");
            let body = format!("Error: {} {}", upstream.status.as_u16(), upstream.reason());
            let mut response = Response::new(Body::from(body));
            *response.status_mut() = upstream.status;
            response.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
            );
            return Ok(response);
        }

        let filename = filename
            .filter(|name| !name.is_empty())
            .or_else(|| path.rsplit('/').find(|segment| !segment.is_empty()))
            .unwrap_or(FALLBACK_FILENAME);

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            upstream
                .headers
                .get(CONTENT_TYPE)
                .cloned()
                .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
        );
        if let Some(disposition) = attachment(filename) {
            headers.insert(CONTENT_DISPOSITION, disposition);
        }
        headers.insert(CACHE_CONTROL, HeaderValue::from_static(ONE_HOUR_PUBLIC_CACHE));
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(PROXY_SOURCE_HEADER, HeaderValue::from_static(PROXY_SOURCE));

        let mut response = Response::new(upstream.body);
        *response.status_mut() = upstream.status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamResponse;
    use async_trait::async_trait;
    use axum::http::StatusCode;

    struct FixedStatus(StatusCode);

    #[async_trait]
    impl Upstream for FixedStatus {
        async fn fetch(&self, url: &Url) -> Result<UpstreamResponse> {
            Ok(UpstreamResponse {
                status: self.0,
                headers: HeaderMap::new(),
                body: Body::from(url.to_string()),
            })
        }
    }

    fn proxy(status: StatusCode) -> GistProxy {
        GistProxy::new(
            Arc::new(FixedStatus(status)),
            "https://gist.githubusercontent.com/",
        )
    }

    #[tokio::test]
    async fn rejects_short_paths() {
        let err = proxy(StatusCode::OK)
            .fetch("bob/abc/raw", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolveError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn serves_download_with_proxy_headers() {
        let response = proxy(StatusCode::OK)
            .fetch("bob/abc/raw/123/notes.md", None)
            .await
            .unwrap();

        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
        assert_eq!(headers[CONTENT_DISPOSITION], "attachment; filename=\"notes.md\"");
        assert_eq!(headers[CACHE_CONTROL], "public, max-age=3600");
        assert_eq!(headers["x-proxy-source"], "ferry-gist-proxy");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(
            &body[..],
            b"https://gist.githubusercontent.com/bob/abc/raw/123/notes.md"
        );
    }

    #[tokio::test]
    async fn query_filename_wins() {
        let response = proxy(StatusCode::OK)
            .fetch("bob/abc/raw/notes.md", Some("renamed.txt"))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"renamed.txt\""
        );
    }

    #[tokio::test]
    async fn upstream_failure_is_mirrored() {
        let response = proxy(StatusCode::FORBIDDEN)
            .fetch("bob/abc/raw/notes.md", None)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Error: 403 Forbidden");
    }
}
