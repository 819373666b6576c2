use axum::Router;
use axum_helpers::{JwtAuth, create_app, health_router, with_common_layers};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{
    AuthorizationService, InMemoryUserRepository, TokenSigner, UserRepository, UserService,
    handlers,
};
use tracing::info;

mod config;
mod openapi;

use config::Config;

/// All HTTP routes: the users API under `/v1`, health and the OpenAPI document.
fn app<R, S>(users: UserService<R>, authorization: AuthorizationService<R, S>) -> Router
where
    R: UserRepository + 'static,
    S: TokenSigner + 'static,
{
    let api = Router::new()
        .nest("/v1", handlers::router(users, authorization))
        .merge(openapi::router())
        .merge(health_router(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")));

    with_common_layers(api)
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    // Load configuration from environment variables
    let config = Config::from_env()?;

    // Initialize tracing with ErrorLayer for span trace capture
    init_tracing(&config.environment);

    let users =
        UserService::with_cache_config(InMemoryUserRepository::new(), config.user_cache.clone());
    let authorization = AuthorizationService::new(users.clone(), JwtAuth::new(&config.jwt));

    info!(
        token_header = %authorization.token_header(),
        cache_ttl = ?config.user_cache.ttl,
        "Starting authorization API"
    );

    create_app(app(users, authorization), &config.server)
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Authorization API shutdown complete");
    Ok(())
}
