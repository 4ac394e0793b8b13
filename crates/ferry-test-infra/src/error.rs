use thiserror::Error;

/// Failures while starting or probing a test fixture.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("failed to run container: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("redis fixture unreachable: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis fixture answered PING with {0:?}")]
    Unhealthy(String),
}

pub type Result<T> = std::result::Result<T, TestInfraError>;
