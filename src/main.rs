use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use vitaltrack::api::start_server;
use vitaltrack::app_state::AppState;
use vitaltrack::{config, db};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    if let Err(e) = std::fs::create_dir_all(config::app_data_dir()) {
        tracing::error!("Cannot create data directory: {e}");
        std::process::exit(1);
    }

    // Open once at startup so migration failures surface before binding.
    let db_path = config::database_path();
    match db::open_database(&db_path) {
        Ok(conn) => {
            let tables = db::count_tables(&conn).unwrap_or(0);
            tracing::info!(path = %db_path.display(), tables, "Database ready");
        }
        Err(e) => {
            tracing::error!("Database initialization failed: {e}");
            std::process::exit(1);
        }
    }

    let state = Arc::new(AppState::new(db_path));
    let addr = SocketAddr::new(config::bind_address(), config::server_port());

    let mut handle = match start_server(state, addr).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on http://{}", handle.addr);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    handle.shutdown();
}
