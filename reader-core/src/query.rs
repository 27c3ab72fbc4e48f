use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::Error;
use crate::models::ArticleWithFeed;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub category: Option<String>,
}

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            category: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

#[derive(Debug, Serialize)]
pub struct ArticlePage {
    pub articles: Vec<ArticleWithFeed>,
    pub pagination: Pagination,
}

/// One page of articles joined with their feed's title/url, newest
/// first, optionally restricted to a feed category. The total runs as a
/// separate count over the same filter.
pub async fn list_articles(pool: &SqlitePool, params: &PageParams) -> Result<ArticlePage, Error> {
    let page = params.page.max(DEFAULT_PAGE);
    let limit = if params.limit > 0 { params.limit } else { DEFAULT_LIMIT };
    let offset = (page - 1) * limit;

    // Empty query-string values ("?category=") mean no filter.
    let category = params.category.as_deref().filter(|c| !c.is_empty());

    let (articles, total) = match category {
        Some(category) => {
            let articles = sqlx::query_as::<_, ArticleWithFeed>(
                "SELECT a.*, f.title AS feed_title, f.url AS feed_url \
                 FROM articles a INNER JOIN feeds f ON a.feed_id = f.id \
                 WHERE f.category = ? \
                 ORDER BY a.published_at DESC LIMIT ? OFFSET ?",
            )
            .bind(category)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM articles a INNER JOIN feeds f ON a.feed_id = f.id \
                 WHERE f.category = ?",
            )
            .bind(category)
            .fetch_one(pool)
            .await?;
            (articles, total)
        }
        None => {
            let articles = sqlx::query_as::<_, ArticleWithFeed>(
                "SELECT a.*, f.title AS feed_title, f.url AS feed_url \
                 FROM articles a INNER JOIN feeds f ON a.feed_id = f.id \
                 ORDER BY a.published_at DESC LIMIT ? OFFSET ?",
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;
            let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles")
                .fetch_one(pool)
                .await?;
            (articles, total)
        }
    };

    Ok(ArticlePage {
        articles,
        pagination: Pagination {
            page,
            limit,
            total,
            pages: pages_for(total, limit),
        },
    })
}

pub fn pages_for(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
