//! News API client and feed state.
//!
//! Articles come from a remote listing service. [`NewsClient`] is the thin
//! HTTP half: one request per call, `Accept-Language` carrying the active
//! language, every failure mapped to an [`ApiError`] with a numeric status
//! code (500 for anything that never produced an HTTP status). [`NewsFeed`]
//! is the stateful half the presentation layer reads: refetches triggered by
//! a language change apply their result only while they are still the most
//! recently initiated fetch.
//!
//! Article identity is the `slug`; the numeric `id` is legacy and kept only
//! because the upstream still sends it.

use crate::i18n::Language;
use crate::latest::{Latest, Ticket};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// A single news article as the listing service returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsItem {
    /// Legacy numeric identifier; prefer `slug`.
    #[serde(default)]
    pub id: i64,
    /// Stable, URL-safe identity of the article.
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub content: String,
    /// Publication date, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// Explicit listing position; 0 means "no explicit position".
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub created_at: String,
}

/// The `{status, message, data, statusCode}` envelope the service wraps
/// every response in.
#[derive(Debug, Deserialize)]
pub struct NewsEnvelope<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub data: T,
    #[serde(rename = "statusCode", default)]
    pub status_code: u16,
}

/// A failed news operation: human-readable message plus the numeric status
/// code for programmatic branching. Transport errors, timeouts, and
/// malformed bodies all carry 500.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (status {status_code})")]
pub struct ApiError {
    pub message: String,
    pub status_code: u16,
}

impl ApiError {
    pub fn new(message: impl Into<String>, status_code: u16) -> Self {
        Self {
            message: message.into(),
            status_code,
        }
    }

    fn transport(e: reqwest::Error, fallback: &str) -> Self {
        let message = if e.is_timeout() {
            format!("{}: request timed out", fallback)
        } else {
            format!("{}: {}", fallback, e)
        };
        Self::new(message, 500)
    }
}

/// HTTP client for the news listing service.
#[derive(Debug, Clone)]
pub struct NewsClient {
    client: reqwest::Client,
    base_url: String,
}

impl NewsClient {
    /// Build a client against `base_url` with an explicit request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the article listing for `language`, normalized per the listing
    /// invariants (explicit order first, then reverse-chronological; unique
    /// slugs).
    pub async fn list(&self, language: Language) -> Result<Vec<NewsItem>, ApiError> {
        let url = format!("{}/news", self.base_url);
        let envelope: NewsEnvelope<Vec<NewsItem>> =
            self.fetch(&url, language, "Failed to fetch news").await?;
        Ok(normalize_listing(envelope.data))
    }

    /// Fetch a single article by its slug.
    ///
    /// A slug the service does not know is an error (the service answers
    /// non-2xx), never an empty success. Slugs are URL-safe by contract;
    /// anything else is rejected here (status 400) before it can change the
    /// request target.
    pub async fn get_by_slug(
        &self,
        slug: &str,
        language: Language,
    ) -> Result<NewsItem, ApiError> {
        if !valid_slug(slug) {
            return Err(ApiError::new("Invalid article slug", 400));
        }
        let url = format!("{}/news/{}", self.base_url, slug);
        let envelope: NewsEnvelope<NewsItem> = self
            .fetch(&url, language, "Failed to fetch news details")
            .await?;
        Ok(envelope.data)
    }

    async fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        language: Language,
        fallback: &str,
    ) -> Result<NewsEnvelope<T>, ApiError> {
        let response = self
            .client
            .get(url)
            .header("Accept-Language", language.code())
            .send()
            .await
            .map_err(|e| ApiError::transport(e, fallback))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(e, fallback))?;

        if !status.is_success() {
            return Err(ApiError::new(error_message(&body, fallback), status.as_u16()));
        }

        serde_json::from_str(&body)
            .map_err(|e| ApiError::new(format!("{}: {}", fallback, e), 500))
    }
}

/// A slug usable verbatim as one URL path segment: non-empty ASCII
/// alphanumerics, `-`, and `_` only.
fn valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Pull a human-readable message out of an error body, falling back to a
/// generic one when the body is not the expected envelope.
fn error_message(body: &str, fallback: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Enforce the listing invariants: articles with an explicit `order` come
/// first in ascending order, the rest follow reverse-chronologically, and a
/// slug appears at most once (first occurrence wins).
pub fn normalize_listing(mut items: Vec<NewsItem>) -> Vec<NewsItem> {
    items.sort_by(|a, b| match (a.order > 0, b.order > 0) {
        (true, true) => a.order.cmp(&b.order).then(cmp_date_desc(a, b)),
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        (false, false) => cmp_date_desc(a, b),
    });

    let mut seen = std::collections::HashSet::new();
    items.retain(|item| {
        let fresh = seen.insert(item.slug.clone());
        if !fresh {
            warn!("Dropping duplicate news slug '{}'", item.slug);
        }
        fresh
    });

    items
}

fn cmp_date_desc(a: &NewsItem, b: &NewsItem) -> std::cmp::Ordering {
    parse_date(&b.date).cmp(&parse_date(&a.date))
}

fn parse_date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .or_else(|_| {
            chrono::DateTime::parse_from_rfc3339(date).map(|dt| dt.date_naive())
        })
        .unwrap_or(NaiveDate::MIN)
}

/// Snapshot of the feed as the presentation layer should render it.
#[derive(Debug, Clone, Default)]
pub struct FeedState {
    pub items: Vec<NewsItem>,
    pub error: Option<ApiError>,
    /// The language of the data currently held, if any fetch has landed.
    pub language: Option<Language>,
}

/// Stateful news listing with stale-result suppression.
///
/// `refetch` is triggered on every language change. If a newer refetch is
/// initiated while an older one is still in flight, the older completion is
/// discarded: the state only ever reflects the most recently requested
/// language, regardless of which request finishes first.
#[derive(Debug)]
pub struct NewsFeed {
    client: NewsClient,
    latest: Latest,
    state: Mutex<FeedState>,
}

impl NewsFeed {
    pub fn new(client: NewsClient) -> Self {
        Self {
            client,
            latest: Latest::new(),
            state: Mutex::new(FeedState::default()),
        }
    }

    /// Fetch the listing for `language` and apply it unless outrun.
    ///
    /// Returns `true` when the result was applied, `false` when it was
    /// discarded because a newer refetch started in the meantime.
    pub async fn refetch(&self, language: Language) -> bool {
        let ticket = self.latest.begin();
        let result = self.client.list(language).await;
        self.apply_if_current(&ticket, language, result)
    }

    /// Apply a completed fetch unless its ticket has been outrun.
    ///
    /// The staleness check runs under the state lock, with no await between
    /// check and write, so a newer refetch completing on another thread
    /// cannot be overwritten by this one.
    fn apply_if_current(
        &self,
        ticket: &Ticket,
        language: Language,
        result: Result<Vec<NewsItem>, ApiError>,
    ) -> bool {
        let mut state = self.state.lock().expect("feed lock poisoned");

        if !ticket.is_current() {
            warn!(
                "Discarding stale news listing for language '{}'",
                language.code()
            );
            return false;
        }

        match result {
            Ok(items) => {
                state.items = items;
                state.error = None;
            }
            Err(e) => {
                state.items = Vec::new();
                state.error = Some(e);
            }
        }
        state.language = Some(language);
        true
    }

    /// The current feed state, for rendering.
    pub fn snapshot(&self) -> FeedState {
        self.state.lock().expect("feed lock poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(slug: &str, date: &str, order: i64) -> NewsItem {
        NewsItem {
            id: 0,
            slug: slug.to_string(),
            title: format!("Title {}", slug),
            subtitle: String::new(),
            content: "body".to_string(),
            date: date.to_string(),
            image: String::new(),
            images: Vec::new(),
            order,
            created_at: String::new(),
        }
    }

    // ==================== Envelope Deserialization Tests ====================

    #[test]
    fn test_list_envelope_deserialization() {
        let json = r#"{
            "status": "success",
            "message": "ok",
            "data": [
                {
                    "id": 3,
                    "slug": "expansion-2024",
                    "title": "Regional expansion",
                    "subtitle": "New offices",
                    "content": "We opened two offices.",
                    "date": "2024-03-10",
                    "image": "/img/expansion.jpg",
                    "images": ["/img/a.jpg", "/img/b.jpg"],
                    "order": 1,
                    "created_at": "2024-03-10T08:00:00Z"
                }
            ],
            "statusCode": 200
        }"#;

        let envelope: NewsEnvelope<Vec<NewsItem>> =
            serde_json::from_str(json).expect("Should deserialize");

        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.data.len(), 1);
        assert_eq!(envelope.data[0].slug, "expansion-2024");
        assert_eq!(envelope.data[0].images.len(), 2);
    }

    #[test]
    fn test_detail_envelope_deserialization() {
        let json = r#"{
            "status": "success",
            "message": "ok",
            "data": {
                "slug": "launch",
                "title": "Launch",
                "content": "We launched.",
                "date": "2024-01-01"
            },
            "statusCode": 200
        }"#;

        let envelope: NewsEnvelope<NewsItem> =
            serde_json::from_str(json).expect("Should deserialize");

        // Optional fields default rather than failing the whole document
        assert_eq!(envelope.data.id, 0);
        assert_eq!(envelope.data.order, 0);
        assert!(envelope.data.images.is_empty());
    }

    #[test]
    fn test_item_without_slug_fails() {
        let json = r#"{"title": "No identity", "content": "x", "date": "2024-01-01"}"#;
        let result: Result<NewsItem, _> = serde_json::from_str(json);
        assert!(result.is_err(), "slug is the identity and must be present");
    }

    // ==================== Listing Invariant Tests ====================

    #[test]
    fn test_explicit_order_comes_first_ascending() {
        let items = vec![
            item("c", "2024-05-01", 0),
            item("b", "2024-01-01", 2),
            item("a", "2024-01-01", 1),
        ];

        let sorted = normalize_listing(items);
        let slugs: Vec<_> = sorted.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unordered_items_reverse_chronological() {
        let items = vec![
            item("old", "2023-02-14", 0),
            item("new", "2024-06-30", 0),
            item("mid", "2023-11-01", 0),
        ];

        let sorted = normalize_listing(items);
        let slugs: Vec<_> = sorted.iter().map(|i| i.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mid", "old"]);
    }

    #[test]
    fn test_equal_order_ties_break_by_date_desc() {
        let items = vec![item("older", "2023-01-01", 5), item("newer", "2024-01-01", 5)];

        let sorted = normalize_listing(items);
        assert_eq!(sorted[0].slug, "newer");
        assert_eq!(sorted[1].slug, "older");
    }

    #[test]
    fn test_duplicate_slugs_dropped_first_wins() {
        let items = vec![
            item("launch", "2024-06-01", 0),
            item("launch", "2024-01-01", 0),
            item("other", "2024-03-01", 0),
        ];

        let sorted = normalize_listing(items);
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].slug, "launch");
        assert_eq!(sorted[0].date, "2024-06-01");
    }

    #[test]
    fn test_unparseable_dates_sort_last() {
        let items = vec![item("bad-date", "someday", 0), item("good", "2024-01-01", 0)];

        let sorted = normalize_listing(items);
        assert_eq!(sorted[0].slug, "good");
    }

    #[test]
    fn test_rfc3339_dates_accepted() {
        assert_eq!(
            parse_date("2024-03-10T08:00:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
        );
    }

    // ==================== Error Mapping Tests ====================

    #[test]
    fn test_error_message_prefers_envelope_message() {
        let body = r#"{"status": "error", "message": "Article not found", "statusCode": 404}"#;
        assert_eq!(error_message(body, "Failed to fetch news"), "Article not found");
    }

    #[test]
    fn test_error_message_accepts_error_field() {
        let body = r#"{"error": "Server exploded"}"#;
        assert_eq!(error_message(body, "Failed to fetch news"), "Server exploded");
    }

    #[test]
    fn test_error_message_falls_back_on_garbage() {
        assert_eq!(
            error_message("<html>502 Bad Gateway</html>", "Failed to fetch news"),
            "Failed to fetch news"
        );
    }

    #[test]
    fn test_api_error_display_includes_status() {
        let err = ApiError::new("Failed to fetch news", 503);
        let shown = err.to_string();
        assert!(shown.contains("Failed to fetch news"));
        assert!(shown.contains("503"));
    }

    // ==================== Feed State Tests ====================

    #[test]
    fn test_feed_starts_empty() {
        let client = NewsClient::new("http://localhost:1", Duration::from_secs(1)).unwrap();
        let feed = NewsFeed::new(client);

        let state = feed.snapshot();
        assert!(state.items.is_empty());
        assert!(state.error.is_none());
        assert!(state.language.is_none());
    }

    #[test]
    fn test_completed_fetch_with_outrun_ticket_not_applied() {
        let client = NewsClient::new("http://localhost:1", Duration::from_secs(1)).unwrap();
        let feed = NewsFeed::new(client);

        // A fetch completes, but a newer one was initiated and has already
        // applied its result in the meantime
        let stale = feed.latest.begin();
        let fresh = feed.latest.begin();

        let applied = feed.apply_if_current(
            &fresh,
            Language::Arabic,
            Ok(vec![item("arabic", "2024-02-01", 0)]),
        );
        assert!(applied);

        let discarded = feed.apply_if_current(
            &stale,
            Language::English,
            Ok(vec![item("english", "2024-01-01", 0)]),
        );
        assert!(!discarded, "stale completion must not overwrite the feed");

        let state = feed.snapshot();
        assert_eq!(state.language, Some(Language::Arabic));
        assert_eq!(state.items[0].slug, "arabic");
    }

    // ==================== Slug Safety Tests ====================

    #[test]
    fn test_valid_slug_accepts_url_safe_names() {
        assert!(valid_slug("expansion-2024"));
        assert!(valid_slug("launch_v2"));
        assert!(valid_slug("a"));
    }

    #[test]
    fn test_valid_slug_rejects_path_changing_characters() {
        assert!(!valid_slug(""));
        assert!(!valid_slug("a/b"));
        assert!(!valid_slug("../admin"));
        assert!(!valid_slug("x?y=1"));
        assert!(!valid_slug("x#frag"));
        assert!(!valid_slug("with space"));
    }

    #[tokio::test]
    async fn test_get_by_slug_rejects_unsafe_slug_without_request() {
        // Nothing listens on this port; a transport attempt would surface
        // as status 500, not the 400 asserted here
        let client = NewsClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();

        let error = client
            .get_by_slug("a/../b", Language::English)
            .await
            .expect_err("unsafe slug must fail");

        assert_eq!(error.status_code, 400);
        assert_eq!(error.message, "Invalid article slug");
    }

    #[tokio::test]
    async fn test_feed_records_error_with_language() {
        // Nothing listens on this port; the fetch fails as a transport error
        let client = NewsClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let feed = NewsFeed::new(client);

        let applied = feed.refetch(Language::English).await;
        assert!(applied);

        let state = feed.snapshot();
        assert!(state.items.is_empty());
        let error = state.error.expect("should carry an error");
        assert_eq!(error.status_code, 500);
        assert_eq!(state.language, Some(Language::English));
    }
}
