use clap::{Parser, ValueEnum};
use ferry_registry::IndexMode;
use ferry_telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "FERRY_LISTEN_ADDR";
pub const STORAGE_BACKEND_ENV: &str = "FERRY_STORAGE_BACKEND";
pub const REDIS_URL_ENV: &str = "FERRY_REDIS_URL";
pub const REDIS_KEY_PREFIX_ENV: &str = "FERRY_REDIS_KEY_PREFIX";
pub const INDEX_MODE_ENV: &str = "FERRY_INDEX_MODE";
pub const DEFAULT_USER_ID_ENV: &str = "FERRY_DEFAULT_USER_ID";
pub const PUBLIC_BASE_URL_ENV: &str = "FERRY_PUBLIC_BASE_URL";
pub const UPSTREAM_TIMEOUT_SECS_ENV: &str = "FERRY_UPSTREAM_TIMEOUT_SECS";
pub const QR_SERVICE_URL_ENV: &str = "FERRY_QR_SERVICE_URL";
pub const GIST_BASE_URL_ENV: &str = "FERRY_GIST_BASE_URL";
pub const ADMIN_USERNAME_ENV: &str = "FERRY_ADMIN_USERNAME";
pub const ADMIN_PASSWORD_ENV: &str = "FERRY_ADMIN_PASSWORD";
pub const LOG_FORMAT_ENV: &str = "FERRY_LOG_FORMAT";
pub const LOG_FILTER_ENV: &str = "FERRY_LOG_FILTER";
pub const OTLP_ENDPOINT_ENV: &str = "FERRY_OTLP_ENDPOINT";

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "redis")]
    Redis,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndexModeArg {
    #[value(name = "per-user")]
    PerUser,
    #[value(name = "global")]
    Global,
}

impl From<IndexModeArg> for IndexMode {
    fn from(value: IndexModeArg) -> Self {
        match value {
            IndexModeArg::PerUser => IndexMode::PerUser,
            IndexModeArg::Global => IndexMode::Global,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "pretty")]
    Pretty,
    #[value(name = "json")]
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ferry")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Mapping store backend. Unset leaves the store unbound.
    #[arg(long, env = STORAGE_BACKEND_ENV, value_enum)]
    pub storage: Option<StorageBackendArg>,

    #[arg(long, env = REDIS_URL_ENV, required_if_eq("storage", "redis"))]
    pub redis_url: Option<String>,

    #[arg(long, env = REDIS_KEY_PREFIX_ENV, default_value = "")]
    pub redis_key_prefix: String,

    #[arg(long, env = INDEX_MODE_ENV, value_enum, default_value_t = IndexModeArg::PerUser)]
    pub index_mode: IndexModeArg,

    #[arg(long, env = DEFAULT_USER_ID_ENV, default_value = ferry_gateway::state::DEFAULT_USER_ID)]
    pub default_user_id: String,

    #[arg(long, env = PUBLIC_BASE_URL_ENV)]
    pub public_base_url: Option<String>,

    #[arg(long, env = UPSTREAM_TIMEOUT_SECS_ENV, default_value_t = 15)]
    pub upstream_timeout_secs: u64,

    #[arg(long, env = QR_SERVICE_URL_ENV, default_value = ferry_resolver::config::DEFAULT_QR_SERVICE_URL)]
    pub qr_service_url: String,

    #[arg(long, env = GIST_BASE_URL_ENV, default_value = ferry_resolver::config::DEFAULT_GIST_BASE_URL)]
    pub gist_base_url: String,

    #[arg(long, env = ADMIN_USERNAME_ENV, requires = "admin_password")]
    pub admin_username: Option<String>,

    #[arg(long, env = ADMIN_PASSWORD_ENV, requires = "admin_username", hide_env_values = true)]
    pub admin_password: Option<String>,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    #[arg(long, env = LOG_FILTER_ENV, default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}
