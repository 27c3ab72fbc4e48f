pub mod config;
pub mod enrich;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod models;
pub mod query;
pub mod storage;

pub use config::Config;
pub use enrich::{GeminiClient, TextGenerator};
pub use error::Error;
pub use feed::{parse_feed, ParsedFeed, ParsedItem};
pub use ingest::{ingest_feed, IngestOutcome, MAX_ARTICLES_PER_INGEST};
pub use models::{Article, ArticleBrief, ArticleStatus, ArticleWithFeed, Feed};
pub use query::{list_articles, ArticlePage, PageParams, Pagination};
