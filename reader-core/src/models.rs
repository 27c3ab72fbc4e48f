use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct Feed {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub site_url: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ArticleStatus {
    Normal,
    Favorite,
}

#[derive(Clone, Debug, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub feed_id: i64,
    pub title: String,
    pub content: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub fetched_at: DateTime<Utc>,
    pub status: ArticleStatus,
    pub summary: Option<String>,
    pub categories: Option<String>,
}

/// An article joined with its owning feed's display metadata.
#[derive(Clone, Debug, Serialize, FromRow)]
pub struct ArticleWithFeed {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub article: Article,
    pub feed_title: String,
    pub feed_url: String,
}

/// Title-only view used when building recommendation prompts.
#[derive(Clone, Debug, FromRow)]
pub struct ArticleBrief {
    pub id: i64,
    pub title: String,
}

#[derive(Clone, Debug)]
pub struct NewFeed {
    pub title: String,
    pub url: String,
    pub site_url: String,
    pub category: String,
}

#[derive(Clone, Debug)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
}
