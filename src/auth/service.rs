// Authentication service - business logic layer

use std::sync::Arc;

use crate::auth::{
    error::AuthError,
    models::{Principal, TokenResponse, UserResponse},
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};
use crate::error::ApiError;

/// Authentication service coordinating login and account lookups
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Verify credentials and issue an access token
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !PasswordService::verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = self
            .tokens
            .generate_access_token(user.id, &user.email, user.role)?;

        tracing::info!("Issued access token for user {}", user.id);
        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_token_duration(),
        })
    }

    /// Account of the calling principal
    pub async fn current_user(&self, principal: &Principal) -> Result<UserResponse, ApiError> {
        let user = self
            .users
            .find_by_id(principal.user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("User", principal.user_id))?;

        Ok(user.into())
    }
}
