use std::sync::Arc;

use anyhow::Context;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Builds the pool once at startup; every handler shares it by clone.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db, config })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        Self { db, config }
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory database with migrations applied. A single connection,
    /// otherwise each pooled connection would see its own empty store.
    pub(crate) async fn test() -> Self {
        use crate::config::JwtConfig;

        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool");
        crate::MIGRATOR.run(&db).await.expect("migrations");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            admin_password: Some("test-admin".into()),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_hours: 24,
            },
        });
        Self { db, config }
    }

    pub(crate) async fn test_without_admin_password() -> Self {
        let mut state = Self::test().await;
        let mut config = (*state.config).clone();
        config.admin_password = None;
        state.config = Arc::new(config);
        state
    }
}
