mod api;
mod config;
mod control;
mod db;
mod ingest;
mod mqtt;
mod reading_cache;
mod stats;

use anyhow::Result;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{
    api::AppState,
    config::Config,
    control::ControlService,
    db::store::ReadingStore,
    ingest::IngestService,
    reading_cache::ReadingCache,
    stats::StatisticsService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env (ignore error if file absent — env vars may be set externally)
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env()?;

    // Connect to DB and run migrations
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database ready");

    let store = ReadingStore::new(pool);

    // Shared in-memory slot for the latest reading
    let cache = ReadingCache::new();

    // One client serves both directions: the ingestion loop polls the
    // event loop, the control service publishes through a clone.
    let (client, eventloop) = mqtt::connect(&config);

    // Spawn the ingestion task
    {
        let ingest = IngestService::new(
            store.clone(),
            cache.clone(),
            config.mqtt_data_topic.clone(),
        );
        tokio::spawn(ingest.run(client.clone(), eventloop));
    }

    let state = AppState {
        store: store.clone(),
        cache,
        stats: StatisticsService::new(store),
        control: ControlService::new(client, config.mqtt_relay_topic.clone()),
    };

    // Start HTTP server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
