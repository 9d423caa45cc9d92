//! Middleware resolving the current user from the session token

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// The authenticated user's id, inserted into request extensions by
/// [`auth_middleware`]
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Uuid);

/// Extract and validate the JWT session token from the Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::NotAuthenticated)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::NotAuthenticated)?;

    let claims = state
        .jwt_service
        .validate_token(token)
        .map_err(|_| ApiError::NotAuthenticated)?;

    req.extensions_mut().insert(CurrentUser(claims.sub));

    Ok(next.run(req).await)
}
