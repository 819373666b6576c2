use axum_helpers::JwtConfig;
use core_config::{FromEnv, server::ServerConfig};
use domain_users::UserCacheConfig;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Application configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub user_cache: UserCacheConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=8080 by default
        let jwt = JwtConfig::from_env()?; // JWT_SECRET is required
        let user_cache = UserCacheConfig::from_env()?;

        Ok(Self {
            server,
            jwt,
            user_cache,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const SECRET: &str = "config-test-secret-with-at-least-32-chars";

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("HOST", Some("127.0.0.1")),
                ("PORT", Some("9090")),
                ("JWT_SECRET", Some(SECRET)),
                ("JWT_TOKEN_HEADER", None),
                ("JWT_TTL_SECONDS", None),
                ("USER_CACHE_TTL_SECONDS", Some("60")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.environment.is_production());
                assert_eq!(config.server.address(), "127.0.0.1:9090");
                assert_eq!(config.jwt.header_name, "Authorization");
                assert_eq!(config.user_cache.ttl, Some(Duration::from_secs(60)));
            },
        );
    }

    #[test]
    fn test_config_requires_jwt_secret() {
        temp_env::with_vars(
            [
                ("JWT_SECRET", None::<&str>),
                ("PORT", None),
                ("USER_CACHE_TTL_SECONDS", None),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("JWT_SECRET"));
            },
        );
    }
}
