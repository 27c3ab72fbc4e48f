use std::sync::Arc;

use reader_core::enrich::GeminiClient;
use reader_core::Config;
use reqwest::Client;
use sqlx::SqlitePool;

pub struct AppState {
    pub pool: SqlitePool,
    pub http: Client,
    pub generator: GeminiClient,
    pub config: Config,
}

pub type SharedState = Arc<AppState>;
