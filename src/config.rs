use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
    pub cookie_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub upload_dir: PathBuf,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = var("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://database/portfolio.db".into());
        let max_connections = var("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);
        let upload_dir = var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("uploads"));
        let session = SessionConfig {
            secret: var("SESSION_SECRET").context("SESSION_SECRET must be set")?,
            issuer: var("SESSION_ISSUER").unwrap_or_else(|| "portfolio-builder".into()),
            ttl_minutes: var("SESSION_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
            cookie_name: var("SESSION_COOKIE").unwrap_or_else(|| "portfolio_session".into()),
        };
        Ok(Self {
            database_url,
            max_connections,
            upload_dir,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn missing_secret_fails() {
        let err = config_from(&[("DATABASE_URL", "sqlite://x.db")]).unwrap_err();
        assert!(err.to_string().contains("SESSION_SECRET must be set"));
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config_from(&[("SESSION_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.database_url, "sqlite://database/portfolio.db");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.session.secret, "s3cret");
        assert_eq!(config.session.issuer, "portfolio-builder");
        assert_eq!(config.session.ttl_minutes, 60 * 24);
        assert_eq!(config.session.cookie_name, "portfolio_session");
    }

    #[test]
    fn overrides_and_unparsable_numbers() {
        let config = config_from(&[
            ("SESSION_SECRET", "s"),
            ("DATABASE_URL", "sqlite:///tmp/p.db"),
            ("UPLOAD_DIR", "/srv/uploads"),
            ("DB_MAX_CONNECTIONS", "not-a-number"),
            ("SESSION_TTL_MINUTES", "30"),
            ("SESSION_COOKIE", "sid"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite:///tmp/p.db");
        assert_eq!(config.upload_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.session.ttl_minutes, 30);
        assert_eq!(config.session.cookie_name, "sid");
    }
}
