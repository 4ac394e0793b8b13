mod cli;

use crate::cli::{StorageBackendArg, CLI};
use anyhow::Context;
use clap::Parser;
use ferry_core::{KeyValueStore, Registry};
use ferry_gateway::{AdminCredentials, App, AppState, GatewayConfig};
use ferry_registry::{MappingRegistry, RegistryConfig};
use ferry_resolver::{HttpUpstream, ResolverConfig};
use ferry_storage::{InMemoryStore, KvIndexStore, RedisStore};
use ferry_telemetry::TelemetryConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    let telemetry = TelemetryConfig::builder()
        .default_filter(config.log_filter.clone())
        .format(config.log_format.into())
        .otlp_endpoint(config.otlp_endpoint.clone())
        .build();
    let _telemetry_guard = ferry_telemetry::init(&telemetry)?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = ?config.storage.map(|s| s.to_string()),
        index_mode = ?config.index_mode,
        "starting ferry gateway"
    );

    let registry_config = RegistryConfig::builder()
        .index_mode(config.index_mode.into())
        .build();
    let registry: Option<Arc<dyn Registry>> = match config.storage {
        None => {
            warn!("no storage backend configured; mapping endpoints will report a configuration error");
            None
        }
        Some(StorageBackendArg::InMemory) => {
            Some(Arc::new(build_registry(InMemoryStore::new(), registry_config)))
        }
        Some(StorageBackendArg::Redis) => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when storage backend is redis")?;
            let store = RedisStore::connect(redis_url, config.redis_key_prefix.clone())
                .await
                .context("failed to connect to redis")?;
            Some(Arc::new(build_registry(store, registry_config)))
        }
    };

    let resolver_config = ResolverConfig::builder()
        .upstream_timeout(Duration::from_secs(config.upstream_timeout_secs))
        .gist_base_url(config.gist_base_url.clone())
        .qr_service_url(config.qr_service_url.clone())
        .build();
    let upstream = Arc::new(HttpUpstream::new(resolver_config.upstream_timeout)?);

    let admin = match (config.admin_username, config.admin_password) {
        (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
        _ => None,
    };
    let gateway_config = GatewayConfig {
        public_base_url: config.public_base_url,
        default_user_id: config.default_user_id,
        admin,
    };

    let state = AppState::new(registry, upstream, &resolver_config, gateway_config);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn build_registry<S>(store: S, config: RegistryConfig) -> MappingRegistry<S, KvIndexStore<S>>
where
    S: KeyValueStore + Clone,
{
    let index = KvIndexStore::new(Arc::new(store.clone()));
    MappingRegistry::new(store, index, config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
