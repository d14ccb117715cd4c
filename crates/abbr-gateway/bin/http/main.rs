mod cli;

use crate::cli::{Cli, StorageBackendArg};
use abbr_core::Shortener;
use abbr_gateway::{App, AppState};
use abbr_generator::Odometer;
use abbr_shortener::ShortenerService;
use abbr_storage::{InMemoryRepository, PostgresRepository};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse();

    abbr_telemetry::init(config.log_format.into())?;

    info!(
        listen_addr = %config.listen_addr,
        storage_backend = %config.storage,
        "starting gateway server"
    );

    let shortener = build_shortener(&config).await?;
    let state = AppState::new(shortener, config.public_base_url.clone());

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn build_shortener(config: &Cli) -> anyhow::Result<Arc<dyn Shortener>> {
    let generator = Odometer::from_clock();

    match config.storage {
        StorageBackendArg::InMemory => Ok(Arc::new(ShortenerService::new(
            InMemoryRepository::new(),
            generator,
        ))),
        StorageBackendArg::Postgres => {
            let dsn = config
                .postgres_dsn
                .as_deref()
                .context("postgres dsn is required when storage backend is postgres")?;
            let repository = PostgresRepository::connect_with(
                dsn,
                config.postgres_max_connections,
                Duration::from_secs(config.postgres_acquire_timeout_secs),
            )
            .await
            .context("failed to open postgres")?;

            if config.init_schema {
                repository
                    .migrate()
                    .await
                    .context("failed to create links table")?;
            }

            Ok(Arc::new(ShortenerService::new(repository, generator)))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down gateway server");
}
