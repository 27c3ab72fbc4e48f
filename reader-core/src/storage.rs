use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, SqlitePool};
use tracing::{info, warn};

use crate::error::Error;
use crate::models::{
    Article, ArticleBrief, ArticleStatus, ArticleWithFeed, Feed, NewArticle, NewFeed,
};

/// Connect with a bounded retry budget: fixed delay, fixed attempt
/// count, error after exhaustion. Runs migrations once connected.
pub async fn connect_with_retry(
    database_url: &str,
    max_attempts: u32,
    delay: Duration,
) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(Error::Database)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut attempt = 1;
    loop {
        match SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options.clone())
            .await
        {
            Ok(pool) => {
                sqlx::migrate!().run(&pool).await?;
                info!("connected to database");
                return Ok(pool);
            }
            Err(err) if attempt < max_attempts => {
                warn!(%err, attempt, max_attempts, "database not reachable, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

pub async fn ping(pool: &SqlitePool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

pub async fn insert_feed(pool: &SqlitePool, feed: &NewFeed) -> Result<Feed, Error> {
    let created = sqlx::query_as::<_, Feed>(
        "INSERT INTO feeds (title, url, site_url, category, created_at) \
         VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&feed.title)
    .bind(&feed.url)
    .bind(&feed.site_url)
    .bind(&feed.category)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;
    Ok(created)
}

pub async fn find_feed_by_url(pool: &SqlitePool, url: &str) -> Result<Option<Feed>, Error> {
    let feed = sqlx::query_as::<_, Feed>("SELECT * FROM feeds WHERE url = ?")
        .bind(url)
        .fetch_optional(pool)
        .await?;
    Ok(feed)
}

pub async fn list_feeds(pool: &SqlitePool) -> Result<Vec<Feed>, Error> {
    let feeds = sqlx::query_as::<_, Feed>("SELECT * FROM feeds ORDER BY title ASC")
        .fetch_all(pool)
        .await?;
    Ok(feeds)
}

/// Deletes a feed; owned articles go with it via the cascade constraint.
/// Returns false when no feed had this id.
pub async fn delete_feed(pool: &SqlitePool, feed_id: i64) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM feeds WHERE id = ?")
        .bind(feed_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_article(
    pool: &SqlitePool,
    feed_id: i64,
    article: &NewArticle,
) -> Result<i64, Error> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO articles (feed_id, title, content, link, published_at, fetched_at, status) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(feed_id)
    .bind(&article.title)
    .bind(&article.content)
    .bind(&article.link)
    .bind(article.published_at)
    .bind(Utc::now())
    .bind(ArticleStatus::Normal)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn get_article(pool: &SqlitePool, article_id: i64) -> Result<Option<Article>, Error> {
    let article = sqlx::query_as::<_, Article>("SELECT * FROM articles WHERE id = ?")
        .bind(article_id)
        .fetch_optional(pool)
        .await?;
    Ok(article)
}

pub async fn count_articles_for_feed(pool: &SqlitePool, feed_id: i64) -> Result<i64, Error> {
    let total =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE feed_id = ?")
            .bind(feed_id)
            .fetch_one(pool)
            .await?;
    Ok(total)
}

/// Most recently published articles, title-only, for recommendation prompts.
pub async fn recent_articles(pool: &SqlitePool, limit: i64) -> Result<Vec<ArticleBrief>, Error> {
    let briefs = sqlx::query_as::<_, ArticleBrief>(
        "SELECT id, title FROM articles ORDER BY published_at DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(briefs)
}

pub async fn articles_by_ids(
    pool: &SqlitePool,
    ids: &[i64],
) -> Result<Vec<ArticleWithFeed>, Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new(
        "SELECT a.*, f.title AS feed_title, f.url AS feed_url \
         FROM articles a INNER JOIN feeds f ON a.feed_id = f.id WHERE a.id IN (",
    );
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    builder.push(")");
    let articles = builder
        .build_query_as::<ArticleWithFeed>()
        .fetch_all(pool)
        .await?;
    Ok(articles)
}

pub async fn update_summary(
    pool: &SqlitePool,
    article_id: i64,
    summary: &str,
) -> Result<(), Error> {
    sqlx::query("UPDATE articles SET summary = ? WHERE id = ?")
        .bind(summary)
        .bind(article_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn update_categories(
    pool: &SqlitePool,
    article_id: i64,
    categories: &[String],
) -> Result<(), Error> {
    sqlx::query("UPDATE articles SET categories = ? WHERE id = ?")
        .bind(categories.join(", "))
        .bind(article_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_article_status(
    pool: &SqlitePool,
    article_id: i64,
    status: ArticleStatus,
) -> Result<Option<Article>, Error> {
    let article = sqlx::query_as::<_, Article>(
        "UPDATE articles SET status = ? WHERE id = ? RETURNING *",
    )
    .bind(status)
    .bind(article_id)
    .fetch_optional(pool)
    .await?;
    Ok(article)
}
