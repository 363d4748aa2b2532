// HTTP handlers for authentication endpoints

use axum::{extract::{rejection::JsonRejection, State}, Json};
use validator::Validate;

use crate::access::{authorize, require_principal, Operation, Resource};
use crate::auth::{
    middleware::MaybePrincipal,
    models::{LoginRequest, TokenResponse, UserResponse},
};
use crate::error::ApiError;
use crate::AppState;

/// Handler for POST /auth/login
/// Exchanges email and password for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = TokenResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 422, description = "Invalid input data", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    tracing::debug!("Login attempt for {}", request.email);
    let token = state.auth_service.login(&request.email, &request.password).await?;
    Ok(Json(token))
}

/// Handler for GET /users/me
/// Returns the account of the authenticated caller
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn me_handler(
    State(state): State<AppState>,
    MaybePrincipal(principal): MaybePrincipal,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(principal.as_ref(), Operation::Read, Resource::Account).into_result()?;
    let principal = require_principal(principal)?;

    let user = state.auth_service.current_user(&principal).await?;
    Ok(Json(user))
}
