use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub session_cookie: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let port = match std::env::var("APP_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|e| anyhow::anyhow!("APP_PORT {v:?}: {e}"))?,
            Err(_) => 8080,
        };
        Ok(Self {
            database_url,
            max_connections,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            session_cookie: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "session_id".into()),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
            host: "0.0.0.0".into(),
            port: 8080,
            session_cookie: "session_id".into(),
        }
    }
}
