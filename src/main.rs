use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use rental_content::api::{router, AppState};
use rental_content::config::Config;
use rental_content::content::{ContentStore, PgContentBackend};
use rental_content::retry::RetryConfig;
use rental_content::validation::ContentGate;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rental_content=info".parse()?),
        )
        .init();

    info!("Starting rental content service");

    // Load configuration from environment
    let config = Config::from_env()?;

    // Step 1: Connect to the database (creates the schema if missing)
    let backend =
        PgContentBackend::connect(&config.database_url, config.database_max_connections).await?;
    info!("Database ready");

    // Step 2: Wire the store, the write gate and the router
    let store = ContentStore::new(Arc::new(backend))
        .with_retry(RetryConfig::write_conflict(config.content_write_retries));
    if config.admin_api_key.is_none() {
        warn!("ADMIN_API_KEY not set, content writes are unauthenticated");
    }
    let state = AppState {
        store,
        gate: Arc::new(ContentGate::new(config.content_sections.clone())),
        api_key: config.admin_api_key.as_deref().map(Arc::from),
    };

    // Step 3: Serve
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}
