use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wishlist_api::app::{router, AppState};
use wishlist_api::config::{self, StoreBackend};
use wishlist_api::database::{DatabaseManager, MemoryPresentStore, PgPresentStore, PresentStore};

#[derive(Debug, Parser)]
#[command(name = "wishlist-api", version, about = "Wishlist present reservation and query API")]
struct Args {
    /// Port to listen on (overrides WISHLIST_API_PORT / PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides API_BIND_ADDRESS)
    #[arg(short, long)]
    bind: Option<String>,

    /// Use the in-memory store instead of PostgreSQL
    #[arg(long)]
    memory: bool,
}

fn init_logger() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wishlist_api=info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();
    init_logger();

    let args = Args::parse();

    let mut config = config::config().clone();
    if let Some(port) = args.port {
        config.api.port = port;
    }
    if let Some(bind) = args.bind {
        config.api.bind_address = bind;
    }
    if args.memory {
        config.database.backend = StoreBackend::Memory;
    }

    tracing::info!("Starting Wishlist API in {:?} mode", config.environment);
    tracing::debug!(?config, "Loaded configuration");

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set");
    }

    let (store, pool): (Arc<dyn PresentStore>, Option<PgPool>) = match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory present store; data is lost on shutdown");
            let store: Arc<dyn PresentStore> = Arc::new(MemoryPresentStore::new());
            (store, None)
        }
        StoreBackend::Postgres => {
            let store = PgPresentStore::connect(&config.database)
                .await
                .context("failed to connect to the present store")?;
            let pool = store.pool().clone();
            let store: Arc<dyn PresentStore> = Arc::new(store);
            (store, Some(pool))
        }
    };

    let state = AppState::new(store, &config);
    let app = router(state, &config);

    let bind_addr = format!("{}:{}", config.api.bind_address, config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Wishlist API listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(pool) = pool {
        DatabaseManager::close(&pool).await;
    }
    tracing::info!("Wishlist API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
