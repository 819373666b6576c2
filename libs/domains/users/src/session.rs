use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{LoginResponse, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;
use crate::signer::TokenSigner;

/// Login by id, gated on the user's ban state.
pub struct AuthorizationService<R: UserRepository, S: TokenSigner> {
    users: UserService<R>,
    signer: Arc<S>,
}

impl<R: UserRepository, S: TokenSigner> Clone for AuthorizationService<R, S> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            signer: self.signer.clone(),
        }
    }
}

impl<R: UserRepository, S: TokenSigner> AuthorizationService<R, S> {
    pub fn new(users: UserService<R>, signer: S) -> Self {
        Self {
            users,
            signer: Arc::new(signer),
        }
    }

    /// Header the API layer puts the issued token in.
    pub fn token_header(&self) -> &str {
        self.signer.token_header_name()
    }

    pub async fn login_by_id(&self, id: Uuid) -> UserResult<LoginResponse> {
        tracing::debug!(user_id = %id, "Login by id");

        let user = self.users.find_entity_by_id(id).await?;

        if user.is_banned_at(Utc::now()) {
            self.users.evict_user_cache(id).await;
            tracing::warn!(user_id = %id, until = ?user.ban_expiration, "Rejected login of banned user");
            return Err(UserError::Blocked(id));
        }

        let view = UserResponse::from(&user);
        let token = self.signer.sign(&view, &user.authorities)?;

        tracing::info!(user_id = %id, "User logged in");
        Ok(LoginResponse { user: view, token })
    }
}
