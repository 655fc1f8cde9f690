use clap::Parser;
use deborgen::jobs::{Lifecycle, Store};
use deborgen::{api, config::Config, db};
use std::sync::Arc;

/// deborgen v0 coordinator
#[derive(Parser, Debug)]
#[command(name = "deborgen-coordinator", about = "deborgen v0 coordinator", version)]
struct Args {
    /// Overrides DEBORGEN_BIND_ADDR
    #[arg(long)]
    bind_addr: Option<String>,

    /// Overrides DEBORGEN_DB_PATH
    #[arg(long)]
    db_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut cfg = Config::from_env()?;
    if let Some(bind_addr) = args.bind_addr {
        cfg.bind_addr = bind_addr;
    }
    if let Some(db_path) = args.db_path {
        cfg.db_path = db_path;
    }

    println!(
        "deborgen coordinator starting... db={} bind={} auth={} lease_seconds={}",
        cfg.db_path,
        cfg.bind_addr,
        if cfg.token.is_some() { "enabled" } else { "disabled" },
        cfg.lease_seconds,
    );

    let pool = db::make_pool(&cfg.database_url()).await?;
    if cfg.migrate_on_startup {
        db::run_migrations(&pool).await?;
    }

    let store = Arc::new(Store::new(pool));
    let lifecycle = Lifecycle::new(store, cfg.lease_seconds);
    let app = api::router(api::ApiState {
        lifecycle,
        token: cfg.token.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    println!("listening on http://{}", cfg.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
