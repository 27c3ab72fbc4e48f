use async_trait::async_trait;
use reader_core::enrich::{
    categorize, parse_id_list, recommend, strip_html_tags, summarize, truncate_chars,
    GenerateError, GeminiClient, TextGenerator,
};
use reader_core::models::ArticleBrief;
use reqwest::Client;

/// Canned generator: `None` behaves like an unset credential.
struct FakeGenerator {
    response: Option<String>,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        self.response.clone().ok_or(GenerateError::MissingCredential)
    }
}

fn briefs() -> Vec<ArticleBrief> {
    vec![
        ArticleBrief { id: 123, title: "Rust 2.0".to_string() },
        ArticleBrief { id: 456, title: "SQLite tricks".to_string() },
        ArticleBrief { id: 789, title: "Feeds forever".to_string() },
    ]
}

#[tokio::test]
async fn all_operations_fail_soft_without_credential() {
    let gemini = GeminiClient::new(Client::new(), None);
    assert!(!gemini.is_configured());

    let summary = summarize(&gemini, "Title", "<p>Body</p>").await;
    assert_eq!(summary, "");

    let categories = categorize(&gemini, "Title", "<p>Body</p>").await;
    assert!(categories.is_empty());

    let interests = vec!["rust".to_string()];
    let ids = recommend(&gemini, &briefs(), &interests).await;
    assert!(ids.is_empty());
}

#[tokio::test]
async fn summarize_trims_generated_text() {
    let generator = FakeGenerator {
        response: Some("  A tidy two sentence summary. It covers the gist.  \n".to_string()),
    };
    let summary = summarize(&generator, "Title", "content").await;
    assert_eq!(summary, "A tidy two sentence summary. It covers the gist.");
}

#[tokio::test]
async fn categorize_splits_and_trims_tags() {
    let generator = FakeGenerator {
        response: Some("Technology, AI , Privacy,,Ethics".to_string()),
    };
    let tags = categorize(&generator, "Title", "content").await;
    assert_eq!(tags, vec!["Technology", "AI", "Privacy", "Ethics"]);
}

#[tokio::test]
async fn recommend_parses_ids_out_of_free_form_text() {
    let generator = FakeGenerator {
        response: Some("Sure! The most relevant are: 123, 456, maybe, 789.".to_string()),
    };
    let interests = vec!["databases".to_string()];
    let ids = recommend(&generator, &briefs(), &interests).await;
    assert_eq!(ids, vec![123, 456, 789]);
}

#[tokio::test]
async fn recommend_short_circuits_on_empty_article_list() {
    let generator = FakeGenerator {
        response: Some("123".to_string()),
    };
    let interests = vec!["anything".to_string()];
    let ids = recommend(&generator, &[], &interests).await;
    assert!(ids.is_empty());
}

#[test]
fn id_list_parsing_drops_non_numeric_tokens() {
    assert_eq!(parse_id_list("123, 456, 789"), vec![123, 456, 789]);
    assert_eq!(parse_id_list("ID 12, none, 7."), vec![12, 7]);
    assert!(parse_id_list("no ids here").is_empty());
    assert!(parse_id_list("").is_empty());
}

#[test]
fn html_tags_are_stripped() {
    assert_eq!(strip_html_tags("<p>Hello <b>world</b></p>"), "Hello world");
    assert_eq!(strip_html_tags("plain text"), "plain text");
    assert_eq!(strip_html_tags("<img src=\"x\"/>after"), "after");
}

#[test]
fn truncation_respects_utf8_boundaries() {
    assert_eq!(truncate_chars("héllo", 2), "hé");
    assert_eq!(truncate_chars("short", 100), "short");
    assert_eq!(truncate_chars("", 5), "");
}
