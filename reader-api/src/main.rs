mod error;
mod routes;
mod state;

use std::sync::Arc;

use reader_core::enrich::GeminiClient;
use reader_core::{storage, Config};
use reqwest::ClientBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env();

    // Startup is the only place where database unavailability is fatal.
    let pool = storage::connect_with_retry(
        &config.database_url,
        config.db_connect_attempts,
        config.db_connect_delay,
    )
    .await?;

    // Long timeout ceiling: slow feed hosts are common and the fetch is
    // awaited inside the request.
    let http = ClientBuilder::new()
        .timeout(config.fetch_timeout)
        .user_agent("reader-api/0.1")
        .build()?;

    let generator = GeminiClient::new(http.clone(), config.gemini_api_key.clone());
    let port = config.port;
    let state = Arc::new(AppState {
        pool,
        http,
        generator,
        config,
    });

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "API listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
