use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::models::user::User;
use crate::store;
use crate::AppState;

/// The authenticated caller, attached to request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn extract_bearer(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

/// Resolve the caller's identity from the Authorization header.
///
/// Missing header, malformed token, bad signature, expired token, and a
/// subject with no matching user row all fail with the same `Unauthorized`
/// response. Read-only: no writes, no token refresh.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = extract_bearer(auth_header).ok_or(AppError::Unauthorized)?;

    let token_data = verify_token(token, &state.config)?;

    // The subject must resolve to a live user: a valid token for a
    // since-deleted account is rejected here.
    let user = store::users::find_by_id(&state.db, token_data.claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}
