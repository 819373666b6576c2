use axum_helpers::JwtAuth;

use crate::error::{UserError, UserResult};
use crate::models::{Authority, UserResponse};

/// Mints opaque bearer tokens for a logged-in user.
#[cfg_attr(test, mockall::automock)]
pub trait TokenSigner: Send + Sync {
    /// Response header the token is carried in.
    fn token_header_name(&self) -> &str;

    fn sign(&self, user: &UserResponse, authorities: &[Authority]) -> UserResult<String>;
}

impl TokenSigner for JwtAuth {
    fn token_header_name(&self) -> &str {
        self.header_name()
    }

    fn sign(&self, user: &UserResponse, authorities: &[Authority]) -> UserResult<String> {
        let roles: Vec<String> = authorities.iter().map(|a| a.to_string()).collect();

        self.create_token(&user.id.to_string(), &user.name, &roles)
            .map_err(|e| UserError::Signing(e.to_string()))
    }
}
