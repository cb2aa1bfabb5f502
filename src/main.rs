use anyhow::anyhow;
use tracing::*;
use tracing_forest::ForestLayer;
use tracing_subscriber::{prelude::*, EnvFilter};

use blog_service::config::tracing::HttpTracingExt;
use blog_service::config::{AppCfg, StoreKind};
use blog_service::store::{pg, ContentStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppCfg::load()?;

    // initialize tracing
    tracing_subscriber::registry()
        .with_http_tracing()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(ForestLayer::default())
        .init();

    match cfg.store {
        StoreKind::Postgres => {
            let url = cfg
                .database_url
                .clone()
                .ok_or(anyhow!("database_url is required for the postgres store"))?;

            info!("Running migrations");
            let migrate_url = url.clone();
            tokio::task::spawn_blocking(move || pg::run_migrations(&migrate_url)).await??;

            info!("Starting DB pool");
            let store = PgStore::connect(&url, cfg.db_pool_size)?;
            serve(store, &cfg).await
        }
        StoreKind::Memory => {
            warn!("using the in-memory store, data is lost on exit");
            serve(MemoryStore::new(), &cfg).await
        }
    }
}

async fn serve<S: ContentStore>(store: S, cfg: &AppCfg) -> anyhow::Result<()> {
    let app = blog_service::app(store, cfg);

    let listener = tokio::net::TcpListener::bind(&cfg.listen_addr).await?;
    info!("starting listening at {}", cfg.listen_addr);
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
