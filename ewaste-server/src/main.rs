//! E-Waste Exchange Server
//!
//! Listings of discarded electronics, requests to claim them, and the
//! approve/reject decision with its notification and email.

mod api;
mod config;
mod server;
mod shutdown;
mod state;
mod uploads;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use ewaste_core::events::email_event_channel;
use ewaste_core::notifier::{LogNotifier, Notifier, SmtpNotifier};
use ewaste_core::processors::EmailSender;
use ewaste_core::store::PgStore;
use server::{build_router, run_server};
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use uploads::UploadStore;

/// E-Waste Exchange - listings, claim requests and decision notifications
#[derive(Parser, Debug)]
#[command(name = "ewaste-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./ewaste-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:5000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting ewaste-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen);
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Get database URL from environment
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(loaded_config.max_connections)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    // Run migrations if requested
    if args.migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    let uploads = UploadStore::new(&loaded_config.server.upload_dir);
    uploads.ensure_dir().await.map_err(|e| {
        tracing::error!("Failed to create upload directory: {}", e);
        e
    })?;

    let notifier: Arc<dyn Notifier> = match loaded_config.email.clone() {
        Some(settings) => {
            tracing::info!(relay = %settings.server, "Decision emails go through SMTP");
            Arc::new(SmtpNotifier::new(settings)?)
        }
        None => {
            tracing::warn!("No [email] section configured, decision emails are only logged");
            Arc::new(LogNotifier)
        }
    };

    // Background email delivery
    let (email_tx, email_rx) = email_event_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let email_sender = tokio::spawn(EmailSender::new(notifier, email_rx, shutdown_rx).run());

    // Create application state
    let store = Arc::new(PgStore::new(db_pool.clone()));
    let state = AppState::new(store.clone(), store, email_tx, uploads);

    // Build the router
    let router = build_router(state, &loaded_config.server);

    // Run the server
    let listen_addr = loaded_config.server.listen;
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Let the email sender finish what is already queued
    let _ = shutdown_tx.send(true);
    if let Err(e) = email_sender.await {
        tracing::error!("EmailSender task failed: {}", e);
    }

    // Close database connections gracefully
    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
