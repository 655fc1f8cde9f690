use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub async fn make_pool(database_url: &str) -> anyhow::Result<SqlitePool> {
    // :memory: only survives for the lifetime of a single connection, so a
    // fresh connection per checkout would each see an empty database.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
