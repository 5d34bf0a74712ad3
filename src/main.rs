//! notesyncd - real-time collaborative note synchronization daemon.

use notesyncd::config::Config;
use notesyncd::network::Gateway;
use notesyncd::state::Hub;
use notesyncd::store::SqliteStore;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(server = %config.server.name, "Starting notesyncd");

    // Open the note store
    let store = SqliteStore::open(&config.database.path).await?;

    // Create the Hub (shared state)
    let hub = Arc::new(Hub::new(&config, Arc::new(store)));

    // Bind the gateway
    let gateway = Gateway::bind(config.listen.address, Arc::clone(&hub)).await?;

    // Ctrl-C triggers a coordinated shutdown: the accept loop stops and
    // every live connection runs its disconnect drain.
    let shutdown = gateway.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received - shutting down");
            let _ = shutdown.send(());
        }
    });

    gateway.run().await?;

    info!("notesyncd stopped");
    Ok(())
}
