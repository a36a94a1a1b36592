use axum::{extract::State, Extension, Form, Json};
use serde::Deserialize;

use crate::auth::jwt::{create_access_token, AccessToken};
use crate::auth::middleware::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::models::user::UserPublic;
use crate::store;
use crate::AppState;

/// OAuth2 password form: the email travels in `username`.
#[derive(Debug, Deserialize)]
pub struct AccessTokenForm {
    pub username: String,
    pub password: String,
}

pub async fn access_token(
    State(state): State<AppState>,
    Form(form): Form<AccessTokenForm>,
) -> AppResult<Json<AccessToken>> {
    let user = store::users::authenticate(&state.db, &form.username, &form.password)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let token = create_access_token(
        user.id,
        Some(state.config.access_token_ttl_secs),
        &state.config,
    )?;

    tracing::debug!(user_id = %user.id, "Access token issued");
    Ok(Json(AccessToken::bearer(token)))
}

/// Round-trips the bearer token: `require_auth` has already resolved the
/// caller, so this just echoes the authenticated user back.
pub async fn test_token(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<UserPublic> {
    Json(user.into())
}
