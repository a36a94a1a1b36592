use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::CurrentUser;
use crate::error::{AppError, AppResult};
use crate::models::entry::{CreateEntryRequest, Entry, EntryList, UpdateEntryRequest};
use crate::store;
use crate::AppState;

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<EntryList>> {
    let entries = store::entries::list_by_owner(&state.db, user.id).await?;
    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<Entry>> {
    let entry = store::entries::get_by_id(&state.db, entry_id, user.id)
        .await?
        .ok_or(AppError::NotFound("Entry not found".into()))?;
    Ok(Json(entry))
}

pub async fn create_entry(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<CreateEntryRequest>,
) -> AppResult<Json<Entry>> {
    body.validate()?;

    let entry = store::entries::create(&state.db, user.id, &body).await?;
    tracing::debug!(entry_id = %entry.id, user_id = %user.id, "Entry created");
    Ok(Json(entry))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(entry_id): Path<Uuid>,
    Json(body): Json<UpdateEntryRequest>,
) -> AppResult<Json<Entry>> {
    body.validate()?;

    let entry = store::entries::update(&state.db, entry_id, user.id, &body)
        .await?
        .ok_or(AppError::NotFound("Entry not found".into()))?;
    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted = store::entries::delete(&state.db, entry_id, user.id).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
