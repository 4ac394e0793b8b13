use std::sync::Arc;

use axum::http::header::HOST;
use axum::http::HeaderMap;
use ferry_core::Registry;
use ferry_resolver::{ContentResolver, GistProxy, QrCodeGenerator, Resolver, ResolverConfig, Upstream};
use typed_builder::TypedBuilder;

use crate::error::AppError;

pub const DEFAULT_USER_ID: &str = "public";

const STORE_NOT_CONFIGURED: &str =
    "Mapping store not configured. Please set FERRY_STORAGE_BACKEND (and FERRY_REDIS_URL for redis).";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct GatewayConfig {
    /// Base for `mappedUrl` in create responses; derived from `Host` when unset.
    #[builder(default, setter(strip_option, into))]
    pub public_base_url: Option<String>,
    #[builder(default = DEFAULT_USER_ID.to_string(), setter(into))]
    pub default_user_id: String,
    /// When set, `/admin` requires matching HTTP Basic credentials.
    #[builder(default, setter(strip_option))]
    pub admin: Option<AdminCredentials>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Clone)]
pub struct AppState {
    registry: Option<Arc<dyn Registry>>,
    resolver: Arc<dyn Resolver>,
    gist: GistProxy,
    qrcode: QrCodeGenerator,
    config: Arc<GatewayConfig>,
}

impl AppState {
    /// `registry` is `None` when no mapping store is bound; store-backed
    /// endpoints then answer with a configuration error.
    pub fn new(
        registry: Option<Arc<dyn Registry>>,
        upstream: Arc<dyn Upstream>,
        resolver_config: &ResolverConfig,
        config: GatewayConfig,
    ) -> Self {
        Self {
            registry,
            resolver: Arc::new(ContentResolver::new(Arc::clone(&upstream))),
            gist: GistProxy::new(Arc::clone(&upstream), resolver_config.gist_base_url.clone()),
            qrcode: QrCodeGenerator::new(upstream, resolver_config.qr_service_url.clone()),
            config: Arc::new(config),
        }
    }

    pub fn registry(&self) -> Result<&dyn Registry, AppError> {
        self.registry
            .as_deref()
            .ok_or_else(|| AppError::Configuration(STORE_NOT_CONFIGURED.to_string()))
    }

    pub fn resolver(&self) -> &dyn Resolver {
        self.resolver.as_ref()
    }

    pub fn gist(&self) -> &GistProxy {
        &self.gist
    }

    pub fn qrcode(&self) -> &QrCodeGenerator {
        &self.qrcode
    }

    pub fn admin_credentials(&self) -> Option<&AdminCredentials> {
        self.config.admin.as_ref()
    }

    /// The caller-supplied user id, or the configured default when absent.
    pub fn user_id_or_default(&self, user_id: Option<String>) -> String {
        user_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| self.config.default_user_id.clone())
    }

    /// Public URL a mapping is served at.
    pub fn mapped_url(&self, headers: &HeaderMap, user_id: &str, custom_path: &str) -> String {
        let base = match &self.config.public_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => request_base_url(headers),
        };
        format!("{base}/m/{user_id}/{custom_path}")
    }
}

fn request_base_url(headers: &HeaderMap) -> String {
    let Some(host) = headers.get(HOST).and_then(|h| h.to_str().ok()) else {
        return String::new();
    };
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("http");
    format!("{scheme}://{host}")
}
