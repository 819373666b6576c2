//! Users Domain
//!
//! User lifecycle and login for the authorization service.
//!
//! # Features
//!
//! - Create, rename, ban, elevate and delete users
//! - Case-insensitive name uniqueness
//! - By-id cache, invalidated on every mutation
//! - Login by id, gated on ban expiration, issuing a signed token
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints under /v1
//! └──────┬──────┘
//!        │
//! ┌──────▼──────────────────────┐
//! │ AuthorizationService ──────────► TokenSigner
//! │ UserService                 │
//! └──────┬──────────────────────┘
//!        │
//! ┌──────▼──────┐
//! │  UserCache  │  ← by-id memoization
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory implementation)
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_users::{
//!     handlers,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//!     session::AuthorizationService,
//! };
//!
//! let users = UserService::new(InMemoryUserRepository::new());
//! let signer = JwtAuth::new(&JwtConfig::new("a-secret-that-is-at-least-32-chars-long"));
//! let authorization = AuthorizationService::new(users.clone(), signer);
//!
//! let router = handlers::router(users, authorization);
//! ```

pub mod cache;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod session;
pub mod signer;

// Re-export commonly used types
pub use cache::{UserCache, UserCacheConfig};
pub use error::{UserError, UserResult};
pub use models::{
    Authority, BanUnit, BanUser, Category, CreateUser, LoginRequest, LoginResponse, UpdateUser,
    User, UserResponse,
};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::UserService;
pub use session::AuthorizationService;
pub use signer::TokenSigner;
