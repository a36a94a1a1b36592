use axum::{extract::State, Extension, Json};
use validator::Validate;

use crate::auth::middleware::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::models::user::{RegisterRequest, UpdateUserRequest, UserPublic};
use crate::store;
use crate::AppState;

pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> AppResult<Json<UserPublic>> {
    body.validate()?;

    if store::users::find_by_email(&state.db, &body.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let user = store::users::create(&state.db, &body).await?;
    tracing::info!(user_id = %user.id, "User registered");
    Ok(Json(user.into()))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<UpdateUserRequest>,
) -> AppResult<Json<UserPublic>> {
    body.validate()?;

    // Changing email must not collide with another account
    if let Some(email) = &body.email {
        if *email != user.email
            && store::users::find_by_email(&state.db, email).await?.is_some()
        {
            return Err(AppError::Conflict("Email already registered".into()));
        }
    }

    let updated = store::users::update(&state.db, user.id, &body)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(updated.into()))
}

pub async fn delete_me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<serde_json::Value>> {
    store::users::delete(&state.db, user.id).await?;
    tracing::info!(user_id = %user.id, "User deleted");
    Ok(Json(serde_json::json!({ "deleted": true })))
}
