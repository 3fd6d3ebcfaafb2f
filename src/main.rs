use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use melofy_api::{
    config::Config,
    db::{create_redis_client, Cache},
    routes::{create_router, AppState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("melofy_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    // Caching is optional; without Redis every lookup goes to Spotify
    let (cache, cache_writer) = match &config.redis_url {
        Some(redis_url) => {
            let client = create_redis_client(redis_url).context("Invalid REDIS_URL")?;
            let (cache, handle) = Cache::new(client);
            tracing::info!("Redis cache enabled");
            (Some(cache), Some(handle))
        }
        None => {
            tracing::info!("REDIS_URL not set, caching disabled");
            (None, None)
        }
    };

    if config.shared_account().is_none() {
        tracing::warn!("Shared Spotify account not configured, public sync will fail");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::from_config(config, cache)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_writer {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
