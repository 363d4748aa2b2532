// Authentication error types

use std::fmt;

use crate::error::ApiError;

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    InvalidToken,
    ExpiredToken,
    MissingToken,
    PasswordHashError,
    TokenGenerationError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::PasswordHashError => write!(f, "Password hashing error"),
            AuthError::TokenGenerationError(msg) => write!(f, "Token generation error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

/// Credential problems surface as 401; hashing and signing failures are internal
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::MissingToken => ApiError::Unauthorized(err.to_string()),
            AuthError::PasswordHashError | AuthError::TokenGenerationError(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
