use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_GIST_BASE_URL: &str = "https://gist.githubusercontent.com";
pub const DEFAULT_QR_SERVICE_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";

/// Outbound fetch settings shared by the resolver and the proxies.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ResolverConfig {
    #[builder(default = DEFAULT_UPSTREAM_TIMEOUT)]
    pub upstream_timeout: Duration,
    #[builder(default = DEFAULT_GIST_BASE_URL.to_string(), setter(into))]
    pub gist_base_url: String,
    #[builder(default = DEFAULT_QR_SERVICE_URL.to_string(), setter(into))]
    pub qr_service_url: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
