//! Outbound header policy.
//!
//! Pure functions from what is known about a response (upstream headers,
//! stored metadata) to the headers sent to the client.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE,
};
use axum::http::{HeaderMap, HeaderValue};
use ferry_core::content_type::DEFAULT_CONTENT_TYPE;
use url::Url;

pub const DEFAULT_BINARY_CONTENT_TYPE: &str = "application/octet-stream";
pub const ONE_HOUR_PUBLIC_CACHE: &str = "public, max-age=3600";

/// Connection-scoped headers that must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// `attachment; filename="<name>"`, or `None` if `name` cannot be a header value.
pub fn attachment(filename: &str) -> Option<HeaderValue> {
    let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
    HeaderValue::from_str(&format!("attachment; filename=\"{escaped}\"")).ok()
}

/// The last path segment of `url` when it looks like a file name.
pub fn download_filename(url: &Url) -> Option<&str> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| segment.contains('.'))
}

/// Headers for a successfully fetched URL mapping.
///
/// Starts from the upstream headers, drops hop-by-hop headers and
/// `Set-Cookie`, falls back to a binary content type, names the download
/// after the URL's last segment when it contains a `.`, and allows any origin.
pub fn upstream_headers(upstream: &HeaderMap, url: &Url) -> HeaderMap {
    let mut headers = upstream.clone();
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
    headers.remove(SET_COOKIE);

    if !headers.contains_key(CONTENT_TYPE) {
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(DEFAULT_BINARY_CONTENT_TYPE),
        );
    }
    if let Some(disposition) = download_filename(url).and_then(attachment) {
        headers.insert(CONTENT_DISPOSITION, disposition);
    }
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers
}

/// Headers for a stored text mapping.
pub fn text_headers(filename: &str, content_type: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    if let Some(disposition) = attachment(filename) {
        headers.insert(CONTENT_DISPOSITION, disposition);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(ONE_HOUR_PUBLIC_CACHE));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers
}
