use crate::config::AppConfig;
use crate::db;
use crate::uploads::storage::{LocalUploads, UploadStore};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub uploads: Arc<dyn UploadStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config).await?;
        db::init_schema(&db).await?;

        let uploads = Arc::new(LocalUploads::new(&config.upload_dir).await?) as Arc<dyn UploadStore>;

        Ok(Self::from_parts(db, config, uploads))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, uploads: Arc<dyn UploadStore>) -> Self {
        Self {
            db,
            config,
            uploads,
        }
    }
}

#[cfg(test)]
pub(crate) fn test_config(database_url: &str, upload_dir: std::path::PathBuf) -> AppConfig {
    AppConfig {
        database_url: database_url.into(),
        max_connections: 2,
        upload_dir,
        session: crate::config::SessionConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            ttl_minutes: 5,
            cookie_name: "portfolio_session".into(),
        },
    }
}

/// Builds a state backed by a fresh SQLite file and upload directory inside
/// `dir`. Keep `dir` alive for the duration of the test.
#[cfg(test)]
pub(crate) async fn test_state(dir: &tempfile::TempDir) -> AppState {
    let url = format!("sqlite://{}", dir.path().join("portfolio.db").display());
    let config = Arc::new(test_config(&url, dir.path().join("uploads")));
    let db = db::connect(&config).await.expect("connect test db");
    db::init_schema(&db).await.expect("init test schema");
    let uploads = Arc::new(
        LocalUploads::new(&config.upload_dir)
            .await
            .expect("create upload dir"),
    ) as Arc<dyn UploadStore>;
    AppState::from_parts(db, config, uploads)
}
