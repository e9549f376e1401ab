//! HTTP API server for the nursing-education platform.
//!
//! Wires the core managers (auth, identity, catalog, activation, schedules,
//! uploads) into a versioned axum REST API backed by PostgreSQL.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use ma_server::{api, config::ServerConfig, logging, metrics};
use medacademy::{
    activation::ActivationManager,
    auth::AuthManager,
    catalog::CatalogManager,
    db::{Database, PgProfileStore, ProfileStore},
    identity::IdentityResolver,
    schedule::ScheduleManager,
    uploads::{FsBlobStore, UploadManager},
};
use pico_args::Arguments;

const HELP: &str = "\
Run the nursing-education platform API server

USAGE:
  ma_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/academy_db]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  METRICS_BIND             Prometheus exporter bind address (optional)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (required)
  PASSWORD_PEPPER          Password hashing pepper (required)
  ADMIN_EMAILS             Comma-separated admin email allowlist
  UPLOAD_DIR               Directory course assets are written under
  UPLOAD_BASE_URL          Public URL prefix for uploaded assets
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind_override: Option<SocketAddr> = pargs.value_from_str("--bind").ok();
    let db_url_override: Option<String> = pargs.value_from_str("--db-url").ok();

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, db_url_override)
        .map_err(|e| anyhow::anyhow!("Configuration error: {e}"))?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(Error::msg)?;
        info!("Metrics exporter listening on {metrics_bind}");
    }

    info!("Starting academy API server at {}", config.bind);

    // Initialize database
    info!("Connecting to database: {}", config.database.database_url);
    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    db.health_check()
        .await
        .map_err(|e| anyhow::anyhow!("Database health check failed: {}", e))?;

    info!("Database connected successfully");

    // Create managers
    let pool = Arc::new(db.pool().clone());
    let profile_store: Arc<dyn ProfileStore> =
        Arc::new(PgProfileStore::new(pool.as_ref().clone()));

    let auth_manager = Arc::new(AuthManager::new(
        pool.clone(),
        config.security.password_pepper.clone(),
        config.security.jwt_secret.clone(),
        config.admin_emails.clone(),
    ));
    let resolver = IdentityResolver::new(Arc::clone(&profile_store), config.admin_emails.clone());
    let catalog = CatalogManager::new(pool.clone());
    let activation = ActivationManager::new(pool.clone());
    let schedules = ScheduleManager::new(pool.clone());
    let uploads = UploadManager::new(Arc::new(FsBlobStore::new(
        config.uploads.dir.clone(),
        config.uploads.public_base_url.clone(),
    )));

    if config.admin_emails.is_empty() {
        log::warn!("ADMIN_EMAILS is empty; the admin surface is unreachable");
    } else {
        info!("Admin allowlist has {} entry(ies)", config.admin_emails.len());
    }

    // Create API state
    let api_state = api::AppState {
        auth_manager,
        resolver,
        profile_store,
        catalog,
        activation,
        schedules,
        uploads,
        login_limiter: api::rate_limiter::shared_login_limiter(),
        pool,
    };

    // Create router
    let app = api::create_router(api_state);

    // Start HTTP server
    info!("Starting HTTP server on {}", config.bind);
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
