/// Bearer token authentication
///
/// Validates the access token and resolves its subject to a
/// [`Principal`], which handlers receive through `Extension<Principal>`.
/// The principal is looked up on every request, so a deleted agent's
/// still-valid token stops working immediately.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use leadcrm_shared::auth::jwt;
use leadcrm_shared::identity::Principal;
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;

pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::BadRequest("Expected Bearer token".to_string()))?;

    let claims = jwt::validate_access_token(token, state.jwt_secret())?;

    let principal: Principal = state.service.principal(claims.sub).await?.ok_or_else(|| {
        debug!(user_id = %claims.sub, "Token subject has no principal");
        ApiError::Unauthorized("Account no longer exists".to_string())
    })?;

    req.extensions_mut().insert(principal);

    Ok(next.run(req).await)
}
