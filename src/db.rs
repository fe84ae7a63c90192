use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tracing::{debug, info};

use crate::config::AppConfig;

const CREATE_USERS: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL
    )
"#;

// One portfolio per user; writes upsert on user_id.
const CREATE_PORTFOLIOS: &str = r#"
    CREATE TABLE IF NOT EXISTS portfolios (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL UNIQUE,
        full_name TEXT,
        contact_info TEXT,
        photo_path TEXT,
        bio TEXT,
        soft_skills TEXT,
        technical_skills TEXT,
        institute TEXT,
        degree TEXT,
        year TEXT,
        grade TEXT,
        work_experience TEXT,
        projects TEXT,
        FOREIGN KEY (user_id) REFERENCES users (id)
    )
"#;

/// Open the SQLite pool, creating the database file (and its directory) if needed.
pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("parse DATABASE_URL {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    if let Some(dir) = database_dir(&config.database_url) {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create database directory {}", dir.display()))?;
    }

    let db = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .context("connect to database")?;
    info!(url = %config.database_url, "database pool ready");
    Ok(db)
}

/// Directory holding the database file named by a `sqlite:` URL, if any.
fn database_dir(url: &str) -> Option<PathBuf> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

pub async fn init_schema(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(CREATE_USERS)
        .execute(db)
        .await
        .context("create users table")?;
    sqlx::query(CREATE_PORTFOLIOS)
        .execute(db)
        .await
        .context("create portfolios table")?;
    debug!("schema initialised");
    Ok(())
}

/// True when the error is a UNIQUE constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_dir_from_url() {
        assert_eq!(
            database_dir("sqlite://database/portfolio.db"),
            Some(PathBuf::from("database"))
        );
        assert_eq!(
            database_dir("sqlite:///var/lib/app/p.db?mode=rwc"),
            Some(PathBuf::from("/var/lib/app"))
        );
        assert_eq!(database_dir("sqlite://portfolio.db"), None);
        assert_eq!(database_dir("sqlite::memory:"), None);
    }

    #[tokio::test]
    async fn schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("nested/portfolio.db").display());
        let config = crate::state::test_config(&url, dir.path().join("uploads"));
        let db = connect(&config).await.expect("connect");
        init_schema(&db).await.expect("first init");
        init_schema(&db).await.expect("second init");

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'portfolios') ORDER BY name",
        )
        .fetch_all(&db)
        .await
        .unwrap();
        assert_eq!(
            tables.into_iter().map(|t| t.0).collect::<Vec<_>>(),
            vec!["portfolios".to_string(), "users".to_string()]
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_a_unique_violation() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("portfolio.db").display());
        let config = crate::state::test_config(&url, dir.path().join("uploads"));
        let db = connect(&config).await.unwrap();
        init_schema(&db).await.unwrap();

        let insert = "INSERT INTO users (email, password_hash) VALUES (?, ?)";
        sqlx::query(insert).bind("a@x.com").bind("h").execute(&db).await.unwrap();
        let err = sqlx::query(insert)
            .bind("a@x.com")
            .bind("h")
            .execute(&db)
            .await
            .unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
