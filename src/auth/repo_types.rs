use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,               // auto-increment user ID
    pub email: String,         // normalized email, unique
    pub password_hash: String, // Argon2 PHC string
}
