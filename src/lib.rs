pub mod api; // REST endpoints under /api/patients
pub mod client; // Client-side cache + HTTP transport
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod seed; // Demo data for empty databases

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::core_state::{CoreError, CoreState};

/// Errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Cannot create data directory {path}: {source}")]
    DataDir {
        path: String,
        source: std::io::Error,
    },
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Database(#[from] db::DatabaseError),
    #[error(transparent)]
    Server(#[from] api::ServerError),
}

/// Initialize tracing from `RUST_LOG`, falling back to the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Open the database, seed it if asked, and serve until Ctrl-C.
pub async fn run(config: ServerConfig) -> Result<(), StartupError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| StartupError::DataDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
    }

    let core = Arc::new(CoreState::open(&config.database_path)?);

    if config.seed_demo_data {
        let conn = core.open_db()?;
        seed::seed_if_empty(&conn)?;
    }

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let mut server = api::start_api_server_on(core, addr).await?;
    tracing::info!("Server is running on {}", server.base_url());

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }

    server.shutdown();
    server.wait().await;
    Ok(())
}
