use crate::auth::memory::MemoryUserStore;
use crate::auth::pg::PgUserStore;
use crate::auth::repo::UserStore;
use crate::auth::services::AuthService;
use crate::config::AppConfig;
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.database_url {
            Some(url) => {
                let db = sqlx::postgres::PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    tracing::warn!(error = %e, "migration failed; continuing");
                }
                Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>
            }
            None => {
                tracing::warn!("DATABASE_URL not set; users are kept in memory only");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };

        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self {
            auth: Arc::new(AuthService::new(store)),
            config,
        }
    }

    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::from_parts(
            Arc::new(MemoryUserStore::new()),
            Arc::new(AppConfig::default()),
        )
    }
}
