// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::EnvFilter;

use crate::application::ingest_service::IngestService;
use crate::application::reading_repository::ReadingRepository;
use crate::infrastructure::config::{load_service_config, StoreBackend};
use crate::infrastructure::influx_repository::InfluxRepository;
use crate::infrastructure::memory_repository::MemoryRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::routes::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("robot_telemetry=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let service_config = load_service_config()?;

    // Create repository (infrastructure layer)
    let repository: Arc<dyn ReadingRepository> = match (service_config.store.backend, service_config.influx) {
        (StoreBackend::Influx, Some(influx)) => Arc::new(InfluxRepository::new(
            influx.host,
            influx.token,
            influx.database,
            influx.retention_policy,
        )),
        (StoreBackend::Influx, None) => anyhow::bail!("influx backend selected without influx settings"),
        (StoreBackend::Memory, _) => Arc::new(MemoryRepository::with_max_items(service_config.store.memory_max_items)),
    };
    tracing::info!(backend = ?service_config.store.backend, "reading store ready");

    // Create services (application layer)
    let ingest_service = IngestService::new(repository);

    // Create application state
    let state = Arc::new(AppState { ingest_service });

    // Build router (presentation layer)
    let app = router(state);

    // Start server
    let addr: SocketAddr = service_config.server.bind_addr.parse()?;
    tracing::info!("Starting robot-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
