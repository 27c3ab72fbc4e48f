use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::models::ArticleBrief;

/// Character budget sent to the model when summarizing.
pub const SUMMARY_CONTENT_BUDGET: usize = 15_000;
/// Character budget sent to the model when categorizing.
pub const CATEGORIZE_CONTENT_BUDGET: usize = 10_000;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("AI credential is not configured")]
    MissingCredential,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Malformed(&'static str),
}

/// Capability injected into the enrichment operations so tests can
/// substitute a canned generator for the live API.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Gemini `generateContent` REST client. Without a credential every
/// call errors with `MissingCredential`, which the operations below
/// swallow into empty results.
pub struct GeminiClient {
    http: Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key,
            model: "gemini-2.0-flash".to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let api_key = self.api_key.as_deref().ok_or(GenerateError::MissingCredential)?;
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, api_key
        );
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await?
            .json::<serde_json::Value>()
            .await?;
        let text = response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(GenerateError::Malformed("missing candidates text"))?;
        Ok(text.to_string())
    }
}

/// 2-3 sentence summary of an article, or an empty string when the
/// credential is unset or the API fails. Never an error for the caller.
pub async fn summarize(generator: &dyn TextGenerator, title: &str, content: &str) -> String {
    let clean = strip_html_tags(content);
    let prompt = format!(
        "Please provide a concise summary of the following article:\n\n\
         Title: {title}\n\n\
         Content: {}\n\n\
         Provide a 2-3 sentence summary that captures the main points. \
         Only return the summary, no preamble.",
        truncate_chars(&clean, SUMMARY_CONTENT_BUDGET)
    );
    match generator.generate(&prompt).await {
        Ok(text) => text.trim().to_string(),
        Err(err) => {
            warn!(%err, "summary generation failed");
            String::new()
        }
    }
}

/// Up to 5 topic tags for an article; empty on any failure.
pub async fn categorize(generator: &dyn TextGenerator, title: &str, content: &str) -> Vec<String> {
    let clean = strip_html_tags(content);
    let prompt = format!(
        "Please analyze the following article and provide up to 5 relevant topics \
         or categories as tags:\n\n\
         Title: {title}\n\n\
         Content: {}\n\n\
         Return ONLY a comma-separated list of topics/categories, with no other text.\n\
         Example response format: \"Technology, AI, Privacy, Ethics\"",
        truncate_chars(&clean, CATEGORIZE_CONTENT_BUDGET)
    );
    match generator.generate(&prompt).await {
        Ok(text) => text
            .split(',')
            .map(|tag| tag.trim().to_string())
            .filter(|tag| !tag.is_empty())
            .collect(),
        Err(err) => {
            warn!(%err, "categorization failed");
            Vec::new()
        }
    }
}

/// Article ids the model considers relevant to the given interests.
/// Non-numeric tokens in the response are dropped; any failure yields
/// an empty list.
pub async fn recommend(
    generator: &dyn TextGenerator,
    articles: &[ArticleBrief],
    interests: &[String],
) -> Vec<i64> {
    if articles.is_empty() {
        return Vec::new();
    }

    let listing = articles
        .iter()
        .enumerate()
        .map(|(index, article)| format!("Article {} (ID: {}): {}", index + 1, article.id, article.title))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "Based on the following user interests: {}\n\n\
         Please recommend which articles from this list would be most relevant:\n\n\
         {listing}\n\n\
         Return ONLY a comma-separated list of article IDs, with no other text.\n\
         Example response format: \"123, 456, 789\"",
        interests.join(", ")
    );

    match generator.generate(&prompt).await {
        Ok(text) => parse_id_list(&text),
        Err(err) => {
            warn!(%err, "recommendation generation failed");
            Vec::new()
        }
    }
}

/// Extract numeric ids from a free-form comma-separated response.
pub fn parse_id_list(text: &str) -> Vec<i64> {
    text.split(',')
        .map(|token| token.chars().filter(|c| c.is_ascii_digit()).collect::<String>())
        .filter(|digits| !digits.is_empty())
        .filter_map(|digits| digits.parse().ok())
        .collect()
}

/// Remove anything between angle brackets. Mirrors the lightweight
/// cleaning applied before sending article bodies to the model.
pub fn strip_html_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out
}

/// First `max_chars` characters, respecting UTF-8 boundaries.
pub fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &input[..byte_index],
        None => input,
    }
}
