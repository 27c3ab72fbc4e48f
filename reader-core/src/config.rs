use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, warn};

/// Environment-driven configuration. Every knob has a logged default so
/// the process can start with nothing set except, optionally, the AI key.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub gemini_api_key: Option<String>,
    pub feed_proxy: Option<String>,
    pub fetch_timeout: Duration,
    pub db_connect_attempts: u32,
    pub db_connect_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: load_or("PORT", "3001"),
            database_url: database_url_from_env(),
            gemini_api_key: load_optional("GEMINI_API_KEY"),
            feed_proxy: load_optional("FEED_PROXY_URL"),
            fetch_timeout: Duration::from_secs(load_or("FEED_FETCH_TIMEOUT_SECS", "60")),
            db_connect_attempts: load_or("DB_CONNECT_ATTEMPTS", "5"),
            db_connect_delay: Duration::from_secs(load_or("DB_CONNECT_DELAY_SECS", "5")),
        }
    }
}

/// Precedence: DATABASE_URL, then a sqlite URL composed from DB_PATH,
/// then an on-disk default next to the process.
fn database_url_from_env() -> String {
    if let Ok(url) = env::var("DATABASE_URL") {
        if !url.trim().is_empty() {
            info!("using DATABASE_URL connection string");
            return url;
        }
    }
    if let Ok(path) = env::var("DB_PATH") {
        if !path.trim().is_empty() {
            info!(path = %path, "using DB_PATH sqlite file");
            return format!("sqlite://{}?mode=rwc", path);
        }
    }
    info!("no database configured, using ./reader.db");
    "sqlite://reader.db?mode=rwc".to_string()
}

fn load_optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            info!("{key} not set");
            None
        }
    }
}

fn load_or<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().unwrap_or_else(|e| {
        warn!("invalid {key} value {raw:?}: {e}, using default: {default}");
        default.parse().map_err(|_| ()).expect("default must parse")
    })
}
