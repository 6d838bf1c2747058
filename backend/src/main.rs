use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod domain;
mod rest;

use config::Config;
use db::DbConnection;
use domain::RecordService;
use rest::AppState;

/// Default log filter; `RUST_LOG` takes precedence
const DEFAULT_LOG_FILTER: &str = "recordbox_backend=info,tower_http=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::load()?;

    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    let schema = config.entity.schema();
    info!("Serving the '{}' collection", schema.collection);
    let app_state = AppState::new(RecordService::new(Arc::new(db), schema));

    let app = rest::create_router(app_state, config.cors_origin_header()?, config.static_dir.clone());

    // Start the server
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
