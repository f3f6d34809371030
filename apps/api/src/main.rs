//! # Yatube API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, middleware::NormalizePath};
use tracing_actix_web::TracingLogger;

use yatube_api::config::AppConfig;
use yatube_api::configure_app;
use yatube_api::observability::RequestIdMiddleware;
use yatube_api::state::{AppState, Repositories};
use yatube_api::telemetry::{TelemetryConfig, init_telemetry};
use yatube_infra::MemoryStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Yatube API Server on {}:{}",
        config.host,
        config.port
    );

    let repos = repositories(&config).await?;
    let state = AppState::from_config(repos, &config).map_err(std::io::Error::other)?;

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::trim())
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .configure(configure_app(state.clone()))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(feature = "postgres")]
async fn repositories(config: &AppConfig) -> std::io::Result<Repositories> {
    use migration::{Migrator, MigratorTrait};
    use yatube_infra::DatabaseConnections;

    let Some(db_config) = config.database.as_ref() else {
        tracing::warn!("DATABASE_URL not set. Running with the in-memory store.");
        return Ok(Repositories::in_memory(&MemoryStore::new()));
    };

    let connections = DatabaseConnections::init(db_config)
        .await
        .map_err(std::io::Error::other)?;

    if config.auto_migrate {
        Migrator::up(&connections.main, None)
            .await
            .map_err(std::io::Error::other)?;
        tracing::info!("Database migrations applied");
    }

    Ok(Repositories::postgres(&connections))
}

#[cfg(not(feature = "postgres"))]
async fn repositories(_config: &AppConfig) -> std::io::Result<Repositories> {
    tracing::info!("Running without postgres feature - using the in-memory store");
    Ok(Repositories::in_memory(&MemoryStore::new()))
}
