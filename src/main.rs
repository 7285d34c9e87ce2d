use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use photo_gateway::{config::Config, routes::create_router, storage::S3Storage, utils::init_logger, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();

    // Load configuration; missing settings abort before binding
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);

    // Connect to object storage and make sure the bucket exists
    let storage = S3Storage::connect(&config.storage)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to initialise object storage: {}", e))?;

    let state = AppState::new(Arc::new(storage));
    let app = create_router(state);

    // Start server
    let listener = TcpListener::bind((config.server.host.as_str(), config.server.port)).await?;
    info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
