use std::str::FromStr;

use reader_core::error::Error;
use reader_core::ingest::{ingest_feed, MAX_ARTICLES_PER_INGEST};
use reader_core::{query, storage};
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    pool
}

fn rss_with_items(count: usize) -> String {
    let mut items = String::new();
    for i in 1..=count {
        items.push_str(&format!(
            r#"<item>
      <title>Item {i}</title>
      <link>http://example.com/{i}</link>
      <pubDate>Mon, 21 Oct 2024 {:02}:00:00 GMT</pubDate>
      <description>Entry number {i}</description>
    </item>"#,
            i % 24
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Feed</title>
    <link>http://example.com/</link>
    <description>Test description</description>
    <category>Testing</category>
    {items}
  </channel>
</rss>"#
    )
}

async fn mount_feed(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(body),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn ingests_feed_with_bounded_article_batch() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed", rss_with_items(25)).await;
    let pool = test_pool().await;
    let url = format!("{}/feed", server.uri());

    let outcome = ingest_feed(&pool, &Client::new(), None, &url).await.unwrap();

    assert_eq!(outcome.feed.title, "Test Feed");
    assert_eq!(outcome.feed.url, url);
    assert_eq!(outcome.feed.category, "Testing");
    assert_eq!(outcome.articles_stored, MAX_ARTICLES_PER_INGEST);
    assert!(!outcome.proxy_used);

    let stored = storage::count_articles_for_feed(&pool, outcome.feed.id).await.unwrap();
    assert_eq!(stored, 20);

    // Only the first 20 items in source order were kept.
    let page = query::list_articles(
        &pool,
        &query::PageParams {
            page: 1,
            limit: 25,
            category: None,
        },
    )
    .await
    .unwrap();
    let titles: Vec<_> = page.articles.iter().map(|a| a.article.title.as_str()).collect();
    assert!(titles.contains(&"Item 1"));
    assert!(titles.contains(&"Item 20"));
    assert!(!titles.contains(&"Item 21"));
}

#[tokio::test]
async fn rejects_duplicate_url_without_writing() {
    let server = MockServer::start().await;
    mount_feed(&server, "/feed", rss_with_items(2)).await;
    let pool = test_pool().await;
    let url = format!("{}/feed", server.uri());
    let client = Client::new();

    ingest_feed(&pool, &client, None, &url).await.unwrap();
    let second = ingest_feed(&pool, &client, None, &url).await;

    assert!(matches!(second, Err(Error::DuplicateFeed)));
    assert_eq!(storage::list_feeds(&pool).await.unwrap().len(), 1);
}

#[tokio::test]
async fn rejects_empty_url() {
    let pool = test_pool().await;
    let result = ingest_feed(&pool, &Client::new(), None, "   ").await;
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[tokio::test]
async fn defaults_missing_channel_fields_independently() {
    let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title></title>
    <link></link>
    <description></description>
    <item>
      <title></title>
    </item>
  </channel>
</rss>"#
        .to_string();

    let server = MockServer::start().await;
    mount_feed(&server, "/bare", body).await;
    let pool = test_pool().await;
    let url = format!("{}/bare", server.uri());

    let outcome = ingest_feed(&pool, &Client::new(), None, &url).await.unwrap();

    assert_eq!(outcome.feed.title, "Untitled Feed");
    assert_eq!(outcome.feed.site_url, url);
    assert_eq!(outcome.feed.category, "Uncategorized");
    assert_eq!(outcome.articles_stored, 1);

    let page = query::list_articles(&pool, &query::PageParams::default()).await.unwrap();
    let article = &page.articles[0].article;
    assert_eq!(article.title, "Untitled Article");
    assert_eq!(article.content, "");
    assert_eq!(article.link, "");
    // No pubDate anywhere: falls back to ingestion time.
    assert!(article.published_at <= chrono::Utc::now());
}

#[tokio::test]
async fn feed_with_zero_items_creates_feed_only() {
    let server = MockServer::start().await;
    mount_feed(&server, "/empty", rss_with_items(0)).await;
    let pool = test_pool().await;
    let url = format!("{}/empty", server.uri());

    let outcome = ingest_feed(&pool, &Client::new(), None, &url).await.unwrap();

    assert_eq!(outcome.articles_stored, 0);
    assert_eq!(storage::count_articles_for_feed(&pool, outcome.feed.id).await.unwrap(), 0);
}

#[tokio::test]
async fn falls_back_to_proxy_when_direct_fetch_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxy"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/rss+xml")
                .set_body_string(rss_with_items(3)),
        )
        .mount(&server)
        .await;

    let pool = test_pool().await;
    let url = format!("{}/blocked", server.uri());
    let proxy_prefix = format!("{}/proxy?url=", server.uri());

    let outcome = ingest_feed(&pool, &Client::new(), Some(&proxy_prefix), &url)
        .await
        .unwrap();

    assert!(outcome.proxy_used);
    assert_eq!(outcome.articles_stored, 3);
    assert_eq!(outcome.feed.url, url);
}

#[tokio::test]
async fn fetch_failure_without_proxy_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let pool = test_pool().await;
    let url = format!("{}/down", server.uri());

    let result = ingest_feed(&pool, &Client::new(), None, &url).await;

    assert!(matches!(result, Err(Error::Fetch(_))));
    assert!(storage::list_feeds(&pool).await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_attempt_can_be_retried() {
    let server = MockServer::start().await;
    let pool = test_pool().await;
    let url = format!("{}/later", server.uri());
    let client = Client::new();

    // First attempt fails: no mock mounted yet, wiremock answers 404.
    let first = ingest_feed(&pool, &client, None, &url).await;
    assert!(matches!(first, Err(Error::Fetch(_))));

    mount_feed(&server, "/later", rss_with_items(1)).await;
    let second = ingest_feed(&pool, &client, None, &url).await.unwrap();
    assert_eq!(second.articles_stored, 1);
}
