//! Storefront server.
//!
//! `storefront` (or `storefront serve`) applies pending migrations and serves HTTP;
//! `storefront migrate up|down` manages the schema and exits.

use clap::{Parser, Subcommand};
use std::sync::Arc;
use storefront::{app, apply_migrations, revert_latest, AppState, Database, MemoryStore, Settings, StorageBackend};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(name = "storefront", version, about = "Product and order CRUD service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Apply or revert schema migrations.
    Migrate {
        #[command(subcommand)]
        direction: Direction,
    },
}

#[derive(Subcommand)]
enum Direction {
    /// Apply every pending migration.
    Up,
    /// Revert the latest applied migration.
    Down,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("storefront=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::Migrate { direction } => {
            let db = Database::connect(&settings.database).await?;
            match direction {
                Direction::Up => {
                    apply_migrations(db.pool()).await?;
                }
                Direction::Down => {
                    revert_latest(db.pool()).await?;
                }
            }
            db.close().await;
            Ok(())
        }
    }
}

async fn serve(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let db = match settings.storage {
        StorageBackend::Postgres => {
            let db = Database::connect(&settings.database).await?;
            apply_migrations(db.pool()).await?;
            Some(db)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on exit");
            None
        }
    };
    let repositories: Arc<dyn storefront::RepositoryProvider> = match &db {
        Some(db) => Arc::new(db.clone()),
        None => Arc::new(MemoryStore::new()),
    };
    let state = AppState::new(repositories, settings.public_base_url.clone());

    let listener = TcpListener::bind(settings.bind_address()).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        public_base_url = %settings.public_base_url,
        "listening"
    );
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = db {
        db.close().await;
    }
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
