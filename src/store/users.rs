use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::models::user::{RegisterRequest, UpdateUserRequest, User};

/// Backstop for the handler-level duplicate pre-check: a registration that
/// loses the race still hits the UNIQUE constraint, which must surface as a
/// conflict rather than an opaque server error.
fn map_unique_violation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            AppError::Conflict("Email already registered".into())
        }
        _ => e.into(),
    }
}

pub async fn create(db: &PgPool, req: &RegisterRequest) -> AppResult<User> {
    let password_hash = hash_password(&req.password)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, first_name, last_name, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&req.email)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(&password_hash)
    .fetch_one(db)
    .await
    .map_err(map_unique_violation)?;

    Ok(user)
}

pub async fn find_by_email(db: &PgPool, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(user)
}

/// Check email + password. Unknown email and wrong password both come back
/// as `None` so callers cannot probe which emails are registered.
pub async fn authenticate(db: &PgPool, email: &str, password: &str) -> AppResult<Option<User>> {
    let Some(user) = find_by_email(db, email).await? else {
        return Ok(None);
    };
    if !verify_password(password, &user.password_hash)? {
        return Ok(None);
    }
    Ok(Some(user))
}

/// Partial profile update in a single statement; absent fields keep their
/// stored values.
pub async fn update(db: &PgPool, id: Uuid, req: &UpdateUserRequest) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            email = COALESCE($2, email),
            first_name = COALESCE($3, first_name),
            last_name = COALESCE($4, last_name),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&req.email)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .fetch_optional(db)
    .await
    .map_err(map_unique_violation)?;

    Ok(user)
}

/// Delete a user; their entries go with them via ON DELETE CASCADE.
pub async fn delete(db: &PgPool, id: Uuid) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            first_name: "A".into(),
            last_name: "B".into(),
            password: "password1".into(),
        }
    }

    #[sqlx::test]
    async fn duplicate_email_is_conflict(db: PgPool) {
        create(&db, &register("a@x.com")).await.unwrap();

        // Straight to the store, as a racing second registration would
        let err = create(&db, &register("a@x.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
    }

    #[sqlx::test]
    async fn authenticate_is_uniform_on_failure(db: PgPool) {
        create(&db, &register("a@x.com")).await.unwrap();

        assert!(authenticate(&db, "a@x.com", "password1").await.unwrap().is_some());
        assert!(authenticate(&db, "a@x.com", "wrong-password").await.unwrap().is_none());
        assert!(authenticate(&db, "nobody@x.com", "password1").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn deleted_user_no_longer_resolves(db: PgPool) {
        let user = create(&db, &register("a@x.com")).await.unwrap();

        assert!(find_by_id(&db, user.id).await.unwrap().is_some());
        assert!(delete(&db, user.id).await.unwrap());
        assert!(find_by_id(&db, user.id).await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn update_changing_email_to_taken_one_is_conflict(db: PgPool) {
        create(&db, &register("a@x.com")).await.unwrap();
        let bob = create(&db, &register("b@x.com")).await.unwrap();

        let changes = UpdateUserRequest {
            email: Some("a@x.com".into()),
            first_name: None,
            last_name: None,
        };
        let err = update(&db, bob.id, &changes).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)), "got {:?}", err);
    }
}
