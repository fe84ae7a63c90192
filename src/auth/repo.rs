use super::repo_types::User;
use crate::db::is_unique_violation;
use crate::error::AppError;
use sqlx::SqlitePool;

impl User {
    /// Find a user by email.
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Create a new user with hashed password. A taken email yields
    /// [`AppError::DuplicateEmail`].
    pub async fn create(db: &SqlitePool, email: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES (?, ?)
            RETURNING id, email, password_hash
            "#,
        )
        .bind(email)
        .bind(password_hash)
        // Drain the RETURNING statement so the insert commits before we hand
        // the connection back to the pool.
        .fetch_all(db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateEmail
            } else {
                AppError::Database(e)
            }
        })?
        .into_iter()
        .next()
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))
    }
}
