use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use reader_core::models::ArticleStatus;
use reader_core::{enrich, ingest, query, storage, Error};

use crate::error::ApiError;
use crate::state::SharedState;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/feeds", get(list_feeds).post(add_feed))
        .route("/feeds/:id", delete(remove_feed))
        .route("/articles", get(list_articles))
        .route("/articles/:id/summary", get(summarize_article))
        .route("/articles/:id/categorize", get(categorize_article))
        .route("/articles/:id/status", put(set_article_status))
        .route("/recommendations", post(recommendations))
        .with_state(state)
}

async fn health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    let database = if storage::ping(&state.pool).await {
        "connected"
    } else {
        "disconnected"
    };
    Json(json!({ "status": "healthy", "database": database }))
}

async fn list_feeds(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let feeds = storage::list_feeds(&state.pool).await?;
    Ok(Json(json!({ "feeds": feeds })).into_response())
}

#[derive(Deserialize)]
struct AddFeedRequest {
    #[serde(default)]
    url: String,
}

async fn add_feed(
    State(state): State<SharedState>,
    Json(body): Json<AddFeedRequest>,
) -> Result<Response, ApiError> {
    let outcome = ingest::ingest_feed(
        &state.pool,
        &state.http,
        state.config.feed_proxy.as_deref(),
        &body.url,
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "feed": outcome.feed,
            "articles_stored": outcome.articles_stored,
            "proxy_used": outcome.proxy_used,
        })),
    )
        .into_response())
}

async fn remove_feed(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    if !storage::delete_feed(&state.pool, id).await? {
        return Err(Error::NotFound("feed").into());
    }
    Ok(Json(json!({ "message": "Feed deleted successfully" })).into_response())
}

async fn list_articles(
    State(state): State<SharedState>,
    Query(params): Query<query::PageParams>,
) -> Result<Response, ApiError> {
    let page = query::list_articles(&state.pool, &params).await?;
    Ok(Json(page).into_response())
}

async fn summarize_article(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    if !state.generator.is_configured() {
        return Err(Error::Configuration("GEMINI_API_KEY").into());
    }
    let article = storage::get_article(&state.pool, id)
        .await?
        .ok_or(Error::NotFound("article"))?;

    let summary = enrich::summarize(&state.generator, &article.title, &article.content).await;
    if summary.is_empty() {
        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Failed to generate summary" })),
        )
            .into_response());
    }

    // Persistence failure should not cost the caller the summary it paid for.
    if let Err(err) = storage::update_summary(&state.pool, id, &summary).await {
        tracing::warn!(%err, article_id = id, "failed to persist summary");
    }

    Ok(Json(json!({
        "article_id": id,
        "title": article.title,
        "summary": summary,
    }))
    .into_response())
}

async fn categorize_article(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<Response, ApiError> {
    if !state.generator.is_configured() {
        return Err(Error::Configuration("GEMINI_API_KEY").into());
    }
    let article = storage::get_article(&state.pool, id)
        .await?
        .ok_or(Error::NotFound("article"))?;

    let categories = enrich::categorize(&state.generator, &article.title, &article.content).await;
    if categories.is_empty() {
        return Ok((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Failed to generate categories" })),
        )
            .into_response());
    }

    if let Err(err) = storage::update_categories(&state.pool, id, &categories).await {
        tracing::warn!(%err, article_id = id, "failed to persist categories");
    }

    Ok(Json(json!({
        "article_id": id,
        "title": article.title,
        "categories": categories,
    }))
    .into_response())
}

#[derive(Deserialize)]
struct StatusRequest {
    status: ArticleStatus,
}

async fn set_article_status(
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Response, ApiError> {
    let article = storage::set_article_status(&state.pool, id, body.status)
        .await?
        .ok_or(Error::NotFound("article"))?;
    Ok(Json(json!({ "article": article })).into_response())
}

#[derive(Deserialize)]
struct RecommendationsRequest {
    #[serde(default)]
    interests: Vec<String>,
}

async fn recommendations(
    State(state): State<SharedState>,
    Json(body): Json<RecommendationsRequest>,
) -> Result<Response, ApiError> {
    if !state.generator.is_configured() {
        return Err(Error::Configuration("GEMINI_API_KEY").into());
    }
    if body.interests.is_empty() {
        return Err(Error::Validation("please provide an array of interests".to_string()).into());
    }

    let recent = storage::recent_articles(&state.pool, 20).await?;
    let ids = enrich::recommend(&state.generator, &recent, &body.interests).await;
    let recommended = storage::articles_by_ids(&state.pool, &ids).await?;
    let total = recommended.len();

    Ok(Json(json!({
        "recommendations": recommended,
        "interests": body.interests,
        "total": total,
    }))
    .into_response())
}
