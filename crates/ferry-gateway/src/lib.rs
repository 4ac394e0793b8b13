//! HTTP surface of the ferry content redirector.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::{AdminCredentials, AppState, GatewayConfig};
