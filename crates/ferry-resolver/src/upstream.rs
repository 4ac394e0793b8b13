use crate::error::{ResolveError, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

/// What an upstream fetch produced, before any header rewriting.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

impl UpstreamResponse {
    pub fn reason(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or_default()
    }
}

/// Issues outbound `GET` requests.
///
/// Implementations must not interpret the status code; non-success
/// responses are returned as-is so callers can mirror them.
#[async_trait]
pub trait Upstream: Send + Sync + 'static {
    async fn fetch(&self, url: &Url) -> Result<UpstreamResponse>;
}

/// [`Upstream`] backed by a `reqwest` client with a whole-request timeout.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

fn map_reqwest_error(url: &Url, err: reqwest::Error) -> ResolveError {
    if err.is_timeout() {
        ResolveError::GatewayTimeout(format!("{url}: {err}"))
    } else {
        ResolveError::Network(format!("{url}: {err}"))
    }
}

impl HttpUpstream {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, url: &Url) -> Result<UpstreamResponse> {
        trace!(url = %url, "fetching upstream");

        let response = self.client.get(url.as_str()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Upstream request failed");
            map_reqwest_error(url, e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        debug!(url = %url, status = status.as_u16(), "Upstream responded");

        Ok(UpstreamResponse {
            status,
            headers,
            body: Body::from_stream(response.bytes_stream()),
        })
    }
}
