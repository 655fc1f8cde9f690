/// Loads configuration from the process environment, with `.env` as a fallback source.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub token: Option<String>,
    pub lease_seconds: i64,
    pub bind_addr: String,
    pub migrate_on_startup: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let db_path = env_or_default("DEBORGEN_DB_PATH", "deborgen.db");
        let token = std::env::var("DEBORGEN_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let lease_seconds = std::env::var("DEBORGEN_LEASE_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);
        let bind_addr = env_or_default("DEBORGEN_BIND_ADDR", "127.0.0.1:8080");
        let migrate_on_startup = env_bool("DEBORGEN_MIGRATE_ON_STARTUP").unwrap_or(true);

        Ok(Self {
            db_path,
            token,
            lease_seconds,
            bind_addr,
            migrate_on_startup,
        })
    }

    /// SQLite connection string for `db_path`. `:memory:` is passed through for tests.
    pub fn database_url(&self) -> String {
        if self.db_path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", self.db_path)
        }
    }
}

fn env_or_default(key: &str, fallback: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
