//! Ownership-scoped entry store.
//!
//! Every per-entry statement carries `user_id = $n` in its WHERE clause, so
//! an entry owned by someone else behaves exactly like one that does not
//! exist. Each mutation is a single statement and therefore atomic.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::entry::{CreateEntryRequest, Entry, EntryList, UpdateEntryRequest};

/// All of the owner's entries, newest first.
pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> AppResult<EntryList> {
    let entries = sqlx::query_as::<_, Entry>(
        r#"
        SELECT * FROM entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(db)
    .await?;

    let count = entries.len();
    Ok(EntryList {
        data: entries,
        count,
    })
}

pub async fn get_by_id(db: &PgPool, id: Uuid, owner_id: Uuid) -> AppResult<Option<Entry>> {
    let entry = sqlx::query_as::<_, Entry>(
        "SELECT * FROM entries WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(db)
    .await?;
    Ok(entry)
}

pub async fn create(db: &PgPool, owner_id: Uuid, req: &CreateEntryRequest) -> AppResult<Entry> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO entries (id, user_id, mood, title, body)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(owner_id)
    .bind(req.mood)
    .bind(&req.title)
    .bind(&req.body)
    .fetch_one(db)
    .await?;

    Ok(entry)
}

/// Partial merge: absent fields keep their stored values, while an explicit
/// `"body": null` clears the body. `None` when the entry is absent or owned
/// by someone else.
pub async fn update(
    db: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    req: &UpdateEntryRequest,
) -> AppResult<Option<Entry>> {
    let entry = sqlx::query_as::<_, Entry>(
        r#"
        UPDATE entries SET
            mood = COALESCE($3, mood),
            title = COALESCE($4, title),
            body = CASE WHEN $5 THEN $6 ELSE body END,
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(owner_id)
    .bind(req.mood)
    .bind(&req.title)
    .bind(req.body.is_some())
    .bind(req.body.clone().flatten())
    .fetch_optional(db)
    .await?;

    Ok(entry)
}

/// Deleting an absent or non-owned entry is a no-op, not an error.
pub async fn delete(db: &PgPool, id: Uuid, owner_id: Uuid) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
