/// Authentication endpoints
///
/// - `POST /v1/auth/signup` - Register an organisor and their organisation
/// - `POST /v1/auth/login` - Exchange email and password for tokens
/// - `POST /v1/auth/refresh` - Exchange a refresh token for an access token
///
/// Agents never sign up; they are created by their organisor.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{created, MutationResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use leadcrm_shared::{
    auth::jwt::{self, TokenPair},
    models::user::User,
    services::Signup,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,

    pub password: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Registers an organisor
///
/// ```text
/// POST /v1/auth/signup
///
/// {
///   "email": "owner@example.com",
///   "username": "owner",
///   "password": "correct-horse-42",
///   "organisation_name": "Acme"
/// }
/// ```
///
/// Responds `201` with the account and `"redirect_to": "/login"`.
///
/// # Errors
///
/// - `409 Conflict`: Email or username already taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    Json(form): Json<Signup>,
) -> ApiResult<(StatusCode, Json<MutationResponse<User>>)> {
    let outcome = state.service.signup(form).await?;
    Ok(created(outcome))
}

/// Logs in with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenPair>> {
    let user = state
        .service
        .authenticate(&req.email, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let tokens = jwt::issue_token_pair(user.id, user.role, state.jwt_secret())?;

    info!(user_id = %user.id, role = user.role.as_str(), "User logged in");
    Ok(Json(tokens))
}

/// Issues a new access token
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid, expired or non-refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}
