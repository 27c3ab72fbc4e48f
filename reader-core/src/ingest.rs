use chrono::Utc;
use reqwest::Client;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::Error;
use crate::feed::{parse_feed, ParsedFeed, ParsedItem};
use crate::models::{Feed, NewArticle, NewFeed};
use crate::storage;

/// Upper bound on articles stored per ingestion.
pub const MAX_ARTICLES_PER_INGEST: usize = 20;

#[derive(Debug)]
pub struct IngestOutcome {
    pub feed: Feed,
    pub articles_stored: usize,
    pub proxy_used: bool,
}

/// Subscribe to a feed URL: duplicate check, fetch-and-parse with an
/// optional one-shot proxy fallback, one feed row, then a bounded batch
/// of article rows. The feed row is committed even if article inserts
/// fail (at-least-the-feed, best-effort articles).
pub async fn ingest_feed(
    pool: &SqlitePool,
    client: &Client,
    proxy: Option<&str>,
    url: &str,
) -> Result<IngestOutcome, Error> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::Validation("feed URL is required".to_string()));
    }

    if storage::find_feed_by_url(pool, url).await?.is_some() {
        return Err(Error::DuplicateFeed);
    }

    let (parsed, proxy_used) = fetch_parsed_feed(client, proxy, url).await?;

    let feed = storage::insert_feed(
        pool,
        &NewFeed {
            title: parsed.title.clone().unwrap_or_else(|| "Untitled Feed".to_string()),
            url: url.to_string(),
            site_url: parsed.link.clone().unwrap_or_else(|| url.to_string()),
            category: parsed.category.clone().unwrap_or_else(|| "Uncategorized".to_string()),
        },
    )
    .await?;

    let mut articles_stored = 0;
    for item in parsed.items.into_iter().take(MAX_ARTICLES_PER_INGEST) {
        match storage::insert_article(pool, feed.id, &new_article(item)).await {
            Ok(_) => articles_stored += 1,
            Err(err) => warn!(feed = %feed.url, %err, "failed to store article, skipping"),
        }
    }

    info!(feed = %feed.url, articles_stored, proxy_used, "feed ingested");
    Ok(IngestOutcome {
        feed,
        articles_stored,
        proxy_used,
    })
}

fn new_article(item: ParsedItem) -> NewArticle {
    NewArticle {
        title: item.title.unwrap_or_else(|| "Untitled Article".to_string()),
        content: item.content.unwrap_or_default(),
        link: item.link.unwrap_or_default(),
        published_at: item.published_at.unwrap_or_else(Utc::now),
    }
}

/// Fetch and parse the feed, retrying exactly once through the proxy
/// when a prefix is configured. Returns whether the proxy was used.
pub async fn fetch_parsed_feed(
    client: &Client,
    proxy: Option<&str>,
    url: &str,
) -> Result<(ParsedFeed, bool), Error> {
    match fetch_and_parse(client, url).await {
        Ok(parsed) => Ok((parsed, false)),
        Err(direct_err) => match proxy {
            Some(prefix) => {
                warn!(feed = %url, error = %direct_err, "direct fetch failed, retrying via proxy");
                let proxied = proxy_url(prefix, url);
                match fetch_and_parse(client, &proxied).await {
                    Ok(parsed) => Ok((parsed, true)),
                    Err(proxy_err) => Err(Error::Fetch(format!(
                        "direct: {direct_err}; proxy: {proxy_err}"
                    ))),
                }
            }
            None => Err(Error::Fetch(direct_err.to_string())),
        },
    }
}

/// Proxied variant of a feed URL, e.g. `https://api.allorigins.win/raw?url=` + encoded target.
pub fn proxy_url(prefix: &str, url: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
    format!("{prefix}{encoded}")
}

#[derive(Debug, thiserror::Error)]
enum FetchFailure {
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Parse(#[from] rss::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
}

async fn fetch_and_parse(client: &Client, url: &str) -> Result<ParsedFeed, FetchFailure> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(FetchFailure::Status(response.status()));
    }
    let bytes = response.bytes().await?;
    Ok(parse_feed(&bytes)?)
}
