//! # Axum Helpers
//!
//! Shared HTTP plumbing for the workspace's Axum services.
//!
//! ## Modules
//!
//! - **[`auth`]**: HS256 JWT issuing and verification
//! - **[`server`]**: Server bootstrap, health endpoint, graceful shutdown
//! - **[`errors`]**: Structured error responses with error codes
//! - **[`extractors`]**: Custom extractors (UUID path, validated JSON)
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{create_app, health_router};
//! use core_config::server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let app = Router::new().merge(health_router("my-service", "0.1.0"));
//!     create_app(app, &ServerConfig::default()).await
//! }
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod server;

pub use auth::{DEFAULT_TOKEN_HEADER, DEFAULT_TOKEN_TTL, JwtAuth, JwtClaims, JwtConfig};
pub use errors::{AppError, ErrorCode, ErrorResponse};
pub use extractors::{UuidPath, ValidatedJson};
pub use server::{HealthResponse, create_app, health_router, shutdown_signal, with_common_layers};
