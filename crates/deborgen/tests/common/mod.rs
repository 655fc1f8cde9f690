use deborgen::api::{self, ApiState};
use deborgen::jobs::{Lifecycle, Store};
use deborgen::{db, Config};
use std::sync::Arc;

pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_config(300, None).await
    }

    pub async fn spawn_with_config(lease_seconds: i64, token: Option<&str>) -> Self {
        let cfg = Config {
            db_path: ":memory:".to_string(),
            token: token.map(str::to_string),
            lease_seconds,
            bind_addr: "127.0.0.1:0".to_string(),
            migrate_on_startup: true,
        };

        let pool = db::make_pool(&cfg.database_url()).await.unwrap();
        db::run_migrations(&pool).await.unwrap();

        let store = Arc::new(Store::new(pool));
        let lifecycle = Lifecycle::new(store, cfg.lease_seconds);
        let app = api::router(ApiState {
            lifecycle,
            token: cfg.token.clone(),
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestApp {
            base_url: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }
}
