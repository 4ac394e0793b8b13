use crate::error::{ResolveError, Result};
use crate::headers::{text_headers, upstream_headers};
use crate::upstream::Upstream;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::StatusCode;
use axum::response::Response;
use ferry_core::{MappingPayload, MappingRecord};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use url::Url;

#[async_trait]
pub trait Resolver: Send + Sync + 'static {
    /// Produces the response served for `record`.
    ///
    /// For URL mappings the response status mirrors the upstream; a
    /// non-success upstream status is returned as [`ResolveError::Upstream`].
    async fn resolve(&self, record: &MappingRecord) -> Result<Response>;
}

/// Serves URL mappings by fetching them through an [`Upstream`] and text
/// mappings from the record itself.
#[derive(Clone)]
pub struct ContentResolver {
    upstream: Arc<dyn Upstream>,
}

impl ContentResolver {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }

    async fn proxy(&self, original_url: &str) -> Result<Response> {
        let url = Url::parse(original_url).map_err(|e| {
            warn!(url = %original_url, error = %e, "Stored URL does not parse");
            ResolveError::InvalidStoredUrl(original_url.to_string())
        })?;

        let upstream = self.upstream.fetch(&url).await?;
        if !upstream.status.is_success() {
            debug!(url = %url, status = upstream.status.as_u16(), "Upstream returned an error status");
            return Err(ResolveError::Upstream {
                status: upstream.status,
                reason: upstream.reason().to_string(),
            });
        }

        let headers = upstream_headers(&upstream.headers, &url);
        let mut response = Response::new(upstream.body);
        *response.status_mut() = upstream.status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    fn serve_text(content: &str, filename: &str, content_type: &str) -> Response {
        let mut response = Response::new(Body::from(content.to_owned()));
        *response.status_mut() = StatusCode::OK;
        *response.headers_mut() = text_headers(filename, content_type);
        response
    }
}

#[async_trait]
impl Resolver for ContentResolver {
    async fn resolve(&self, record: &MappingRecord) -> Result<Response> {
        trace!(key = %record.key(), kind = %record.kind(), "resolving mapping");

        match &record.payload {
            MappingPayload::UrlMapping { original_url } => self.proxy(original_url).await,
            MappingPayload::TextContent {
                content,
                filename,
                content_type,
            } => Ok(Self::serve_text(content, filename, content_type)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::UpstreamResponse;
    use axum::body::to_bytes;
    use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE};
    use axum::http::{HeaderMap, HeaderValue};
    use jiff::Timestamp;
    use std::sync::Mutex;

    /// Replies with a canned response and records the requested URLs.
    struct StubUpstream {
        status: StatusCode,
        headers: HeaderMap,
        body: &'static str,
        requested: Mutex<Vec<String>>,
    }

    impl StubUpstream {
        fn new(status: StatusCode, headers: HeaderMap, body: &'static str) -> Arc<Self> {
            Arc::new(Self {
                status,
                headers,
                body,
                requested: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Upstream for StubUpstream {
        async fn fetch(&self, url: &Url) -> Result<UpstreamResponse> {
            self.requested.lock().unwrap().push(url.to_string());
            Ok(UpstreamResponse {
                status: self.status,
                headers: self.headers.clone(),
                body: Body::from(self.body),
            })
        }
    }

    fn ts() -> Timestamp {
        "2024-05-01T10:00:00Z".parse().unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn url_mapping_streams_upstream_body() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(SET_COOKIE, HeaderValue::from_static("sid=1"));
        let upstream = StubUpstream::new(StatusCode::OK, headers, "{\"x\":1}");
        let resolver = ContentResolver::new(upstream.clone());

        let record = MappingRecord::url("bob", "a", "https://example.com/a.json", ts());
        let response = resolver.resolve(&record).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"a.json\""
        );
        assert!(!response.headers().contains_key(SET_COOKIE));
        assert_eq!(body_string(response).await, "{\"x\":1}");
        assert_eq!(
            *upstream.requested.lock().unwrap(),
            ["https://example.com/a.json"]
        );
    }

    #[tokio::test]
    async fn url_mapping_mirrors_upstream_failure() {
        let upstream = StubUpstream::new(StatusCode::NOT_FOUND, HeaderMap::new(), "gone");
        let resolver = ContentResolver::new(upstream);

        let record = MappingRecord::url("bob", "a", "https://example.com/a.json", ts());
        let err = resolver.resolve(&record).await.unwrap_err();

        assert!(matches!(
            &err,
            ResolveError::Upstream { status, .. } if *status == StatusCode::NOT_FOUND
        ));
        assert_eq!(err.to_string(), "Failed to fetch content: 404 Not Found");
    }

    #[tokio::test]
    async fn invalid_stored_url_is_reported() {
        let upstream = StubUpstream::new(StatusCode::OK, HeaderMap::new(), "");
        let resolver = ContentResolver::new(upstream.clone());

        let record = MappingRecord::url("bob", "a", "::not a url::", ts());
        let err = resolver.resolve(&record).await.unwrap_err();

        assert!(matches!(err, ResolveError::InvalidStoredUrl(_)));
        assert!(upstream.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn text_mapping_is_served_inline() {
        let upstream = StubUpstream::new(StatusCode::OK, HeaderMap::new(), "");
        let resolver = ContentResolver::new(upstream.clone());

        let record = MappingRecord::text("bob", "n", "hello", "note.txt", ts());
        let response = resolver.resolve(&record).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"note.txt\""
        );
        assert_eq!(body_string(response).await, "hello");
        assert!(upstream.requested.lock().unwrap().is_empty());
    }
}
