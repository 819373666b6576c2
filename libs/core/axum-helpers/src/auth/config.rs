//! JWT configuration, loaded through `core_config::FromEnv`.

use core_config::{ConfigError, FromEnv, env_or_default, env_parse_or, env_required};

/// Header the issued token travels in unless `JWT_TOKEN_HEADER` says otherwise.
pub const DEFAULT_TOKEN_HEADER: &str = "Authorization";

/// Token lifetime in seconds (15 minutes).
pub const DEFAULT_TOKEN_TTL: i64 = 900;

const MIN_SECRET_LEN: usize = 32;

/// JWT authentication configuration.
///
/// Environment variables:
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_TOKEN_HEADER` (default `Authorization`)
/// - `JWT_TTL_SECONDS` (default 900)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// HMAC signing secret
    pub secret: String,
    /// Response header carrying the token
    pub header_name: String,
    /// Token lifetime in seconds
    pub ttl_seconds: i64,
}

impl JwtConfig {
    /// Config with default header and TTL.
    ///
    /// # Panics
    /// Panics if the secret is shorter than 32 characters.
    pub fn new(secret: impl Into<String>) -> Self {
        let secret = secret.into();
        assert!(
            secret.len() >= MIN_SECRET_LEN,
            "JWT secret must be at least 32 characters"
        );
        Self {
            secret,
            header_name: DEFAULT_TOKEN_HEADER.to_string(),
            ttl_seconds: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_header_name(mut self, header_name: impl Into<String>) -> Self {
        self.header_name = header_name.into();
        self
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: i64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;

        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ParseError {
                key: "JWT_SECRET".to_string(),
                details: format!(
                    "must be at least 32 characters for security (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            });
        }

        let header_name = env_or_default("JWT_TOKEN_HEADER", DEFAULT_TOKEN_HEADER);
        if axum::http::HeaderName::from_bytes(header_name.as_bytes()).is_err() {
            return Err(ConfigError::ParseError {
                key: "JWT_TOKEN_HEADER".to_string(),
                details: format!("'{}' is not a valid HTTP header name", header_name),
            });
        }

        let ttl_seconds = env_parse_or("JWT_TTL_SECONDS", DEFAULT_TOKEN_TTL)?;
        if ttl_seconds <= 0 {
            return Err(ConfigError::ParseError {
                key: "JWT_TTL_SECONDS".to_string(),
                details: "must be positive".to_string(),
            });
        }

        Ok(Self {
            secret,
            header_name,
            ttl_seconds,
        })
    }
}
