use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,        // Subject (user ID)
    pub name: String,       // Display name
    pub roles: Vec<String>, // Authorities
    pub exp: i64,           // Expiration time
    pub iat: i64,           // Issued at
    pub jti: String,        // JWT ID
}

/// Stateless HS256 token issuer/verifier.
#[derive(Clone)]
pub struct JwtAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header_name: String,
    ttl_seconds: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!(header = %config.header_name, ttl_seconds = config.ttl_seconds, "JWT auth initialized");
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            header_name: config.header_name.clone(),
            ttl_seconds: config.ttl_seconds,
        }
    }

    /// Name of the header the token is carried in.
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Signs a token for `user_id` valid for the configured TTL.
    pub fn create_token(
        &self,
        user_id: &str,
        name: &str,
        roles: &[String],
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();

        let claims = JwtClaims {
            sub: user_id.to_string(),
            name: name.to_string(),
            roles: roles.to_vec(),
            exp: (now + Duration::seconds(self.ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
    }

    /// Verifies signature and expiry, returning the claims.
    pub fn verify_token(&self, token: &str) -> Result<JwtClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<JwtClaims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuth")
            .field("header_name", &self.header_name)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::DEFAULT_TOKEN_TTL;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!"))
    }

    #[test]
    fn test_create_and_verify_token() {
        let auth = auth();
        let user_id = Uuid::new_v4().to_string();
        let roles = vec!["user".to_string(), "admin".to_string()];

        let token = auth.create_token(&user_id, "alice", &roles).unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.name, "alice");
        assert_eq!(claims.roles, roles);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TOKEN_TTL);
    }

    #[test]
    fn test_tokens_have_distinct_ids() {
        let auth = auth();
        let a = auth.create_token("id", "n", &[]).unwrap();
        let b = auth.create_token("id", "n", &[]).unwrap();
        assert_ne!(auth.verify_token(&a).unwrap().jti, auth.verify_token(&b).unwrap().jti);
    }

    #[test]
    fn test_verify_rejects_foreign_secret() {
        let token = auth().create_token("id", "n", &[]).unwrap();
        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-also-32-chars-long"));
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let config = JwtConfig::new("this-is-a-valid-secret-with-32-chars!").with_ttl_seconds(-3600);
        let auth = JwtAuth::new(&config);
        let token = auth.create_token("id", "n", &[]).unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_header_name_from_config() {
        let config =
            JwtConfig::new("this-is-a-valid-secret-with-32-chars!").with_header_name("X-Auth-Token");
        assert_eq!(JwtAuth::new(&config).header_name(), "X-Auth-Token");
    }
}
