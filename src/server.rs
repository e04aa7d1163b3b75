//! HTTP server initialization and runtime setup.
//!
//! Builds the admin site, selects the record store and runs the Axum server.

use crate::admin::{LoadedSite, SiteManifest};
use crate::config::Config;
use crate::domain::entities::NewRecord;
use crate::domain::repositories::RecordRepository;
use crate::infrastructure::persistence::{InMemoryRecordRepository, PgRecordRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Loads the configured manifest and registers every admin it declares.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or any registration fails.
pub fn load_site(config: &Config) -> Result<LoadedSite> {
    let manifest = match &config.admin_manifest {
        Some(path) => SiteManifest::from_path(path)?,
        None => SiteManifest::builtin()?,
    };
    let loaded = manifest
        .build(&config.parent_defaults())
        .context("Failed to register admin site")?;

    tracing::info!(
        parents = loaded.site.parents().count(),
        "Admin site registered"
    );
    Ok(loaded)
}

/// Opens the record store: PostgreSQL when configured (with migrations
/// applied), otherwise an in-memory store holding `seed`.
///
/// # Errors
///
/// Returns an error if the database connection or a migration fails.
pub async fn connect_records(
    config: &Config,
    seed: Vec<NewRecord>,
) -> Result<Arc<dyn RecordRepository>> {
    let Some(database_url) = &config.database_url else {
        tracing::info!(records = seed.len(), "Storage: in-memory");
        return Ok(Arc::new(InMemoryRecordRepository::seeded(seed)));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    tracing::info!("Storage: PostgreSQL");
    Ok(Arc::new(PgRecordRepository::new(Arc::new(pool))))
}

/// Runs the HTTP server with the given configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Site registration fails
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let LoadedSite { site, seed } = load_site(&config)?;
    let records = connect_records(&config, seed).await?;

    let app = app_router(AppState::new(site, records));

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}/admin");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutting down");
}
