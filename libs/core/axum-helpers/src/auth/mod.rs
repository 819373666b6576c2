//! Token issuing and verification.
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//! let token = auth.create_token(&user_id.to_string(), "alice", &["user".to_string()])?;
//! response_headers.insert(auth.header_name(), token.parse()?);
//! ```

pub mod config;
pub mod jwt;

pub use config::{DEFAULT_TOKEN_HEADER, DEFAULT_TOKEN_TTL, JwtConfig};
pub use jwt::{JwtAuth, JwtClaims};
