use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use service_tracker::app_state::AppState;
use service_tracker::config::Config;
use service_tracker::db::memory::{InMemoryServiceRequestStore, InMemoryUserStore};
use service_tracker::db::pool::get_db_pool;
use service_tracker::db::store::{PgServiceRequestStore, PgUserStore, ServiceRequestStore, UserStore};
use service_tracker::server::{build_router, serve, shutdown_signal};
use service_tracker::telemetry::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Invalid configuration")?;

    std::fs::create_dir_all(&config.log_dir).context("Failed to create logs directory")?;
    let _log_guard = init_logging(&config.log_dir);

    let mut pool = None;
    let (request_store, user_store): (Arc<dyn ServiceRequestStore>, Arc<dyn UserStore>) =
        match config.database_url.as_deref() {
            Some(url) => {
                let pg = get_db_pool(&config, url)
                    .await
                    .context("Failed to connect to the database")?;
                info!("Connected to PostgreSQL");
                pool = Some(pg.clone());
                (
                    Arc::new(PgServiceRequestStore::new(pg.clone())),
                    Arc::new(PgUserStore::new(pg)),
                )
            }
            None => {
                warn!("DATABASE_URL not set; using in-memory stores, data is lost on exit");
                (
                    Arc::new(InMemoryServiceRequestStore::new()),
                    Arc::new(InMemoryUserStore::new()),
                )
            }
        };

    let bind_addr = config.bind_addr;
    let state = AppState::new(config, request_store, user_store)
        .context("Failed to load page templates")?;
    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    serve(listener, app, shutdown_signal())
        .await
        .context("Server encountered an error")?;

    if let Some(pool) = pool {
        info!("Closing database pool...");
        pool.close().await;
    }
    info!("Shutdown complete.");
    Ok(())
}
