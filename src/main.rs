use std::sync::Arc;
use std::time::Duration;

use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use warta::config::Config;
use warta::fetcher::Fetcher;
use warta::routes::{self, AppState};
use warta::scheduler::Scheduler;
use warta::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warta=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (built-in defaults when no file is present)
    let config = Config::load_or_default("warta.toml")?;
    info!(
        "Watching {} endpoints, cycle every {}s ({:?})",
        config.endpoints.len(),
        config.interval_seconds,
        config.replace
    );

    // Open the snapshot store
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:warta.db?mode=rwc".to_string());
    let store = Arc::new(Store::open(&database_url).await?);
    store.initialize().await?;
    info!("Store initialized");

    // Start the ingestion scheduler
    let scheduler = Arc::new(Scheduler::new(
        store.clone(),
        Fetcher::new(),
        config.endpoints.clone(),
        Duration::from_secs(config.interval_seconds),
        config.replace,
    ));
    let scheduler_handle = scheduler.start();

    // Build router
    let state = Arc::new(AppState {
        store: store.clone(),
    });
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    // Start server
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Server starting on http://localhost:3000");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Shut down: stop the ingestion task, then release the store.
    scheduler_handle.stop();
    scheduler_handle.join().await;
    store.close().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
