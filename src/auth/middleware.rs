// Credential extraction for incoming requests

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use tracing::{debug, warn};

use crate::auth::{error::AuthError, models::Principal, token::TokenService};

/// Principal resolved from the `Authorization` header, if any
///
/// Never rejects: a missing, malformed or invalid token yields `None`,
/// and the access gate decides whether that is acceptable.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<Principal>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
    Arc<TokenService>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);

        match resolve_principal(parts, &tokens) {
            Ok(principal) => {
                debug!(
                    "Resolved principal user_id={}, role={}, endpoint={}",
                    principal.user_id,
                    principal.role,
                    parts.uri.path()
                );
                Ok(MaybePrincipal(Some(principal)))
            }
            Err(AuthError::MissingToken) => Ok(MaybePrincipal(None)),
            Err(e) => {
                warn!("Rejected credentials for endpoint {}: {}", parts.uri.path(), e);
                Ok(MaybePrincipal(None))
            }
        }
    }
}

/// Extract and validate the bearer token carried by a request
pub fn resolve_principal(parts: &Parts, tokens: &TokenService) -> Result<Principal, AuthError> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?
        .trim();

    let claims = tokens.validate_access_token(token)?;
    Ok(claims.into())
}
