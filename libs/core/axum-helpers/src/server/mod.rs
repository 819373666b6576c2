//! Server infrastructure: bootstrap, liveness endpoint and graceful shutdown.

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_app, with_common_layers};
pub use health::{HealthResponse, health_router};
pub use shutdown::shutdown_signal;
