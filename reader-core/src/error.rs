use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("this feed is already in your subscription list")]
    DuplicateFeed,
    #[error("could not parse feed: {0}")]
    Fetch(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} is not configured")]
    Configuration(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}
