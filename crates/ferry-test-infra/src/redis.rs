use crate::{Result, TestInfraError};
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage};
use typed_builder::TypedBuilder;

const REDIS_PORT: u16 = 6379;

#[derive(Debug, Clone, TypedBuilder)]
pub struct RedisConfig {
    #[builder(default = "redis".to_string())]
    image: String,
    #[builder(default = "8.6.0".to_string())]
    tag: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Test fixture for a disposable standalone Redis server.
///
/// The container is removed when the fixture is dropped.
pub struct RedisServer {
    container: ContainerAsync<GenericImage>,
}

impl RedisServer {
    pub async fn start(config: RedisConfig) -> Result<Self> {
        let container = GenericImage::new(config.image, config.tag)
            .with_exposed_port(REDIS_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .start()
            .await?;
        Ok(Self { container })
    }

    pub async fn host(&self) -> Result<String> {
        let host = self.container.get_host().await?.to_string();
        Ok(match host.as_str() {
            "localhost" => String::from("127.0.0.1"),
            _ => host,
        })
    }

    pub async fn port(&self) -> Result<u16> {
        Ok(self.container.get_host_port_ipv4(REDIS_PORT).await?)
    }

    /// Connection URL usable with `redis::Client::open`.
    pub async fn url(&self) -> Result<String> {
        let host = self.host().await?;
        let port = self.port().await?;
        Ok(format!("redis://{host}:{port}"))
    }

    /// Opens a plain client and checks the server answers `PING` with `PONG`.
    pub async fn ping(&self) -> Result<()> {
        let client = redis::Client::open(self.url().await?)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        if reply != "PONG" {
            return Err(TestInfraError::Unhealthy(reply));
        }
        Ok(())
    }
}
