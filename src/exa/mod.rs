//! Exa search provider: request/response types and the provider trait.
//!
//! Every provider call gets its own request struct.  Optional fields use
//! `skip_serializing_if` so anything the caller did not set is left out
//! of the outbound JSON entirely rather than being sent as `null`.

mod client;

pub use client::{ExaClient, DEFAULT_BASE_URL};

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Smallest result count the provider accepts.
pub const MIN_RESULTS: u32 = 1;
/// Largest result count the provider accepts.
pub const MAX_RESULTS: u32 = 25;
/// Result count used when the caller does not pass one.
pub const DEFAULT_NUM_RESULTS: u32 = 5;

/// Clamp a requested result count into `[MIN_RESULTS, MAX_RESULTS]`,
/// falling back to [`DEFAULT_NUM_RESULTS`].
///
/// Hosts send any JSON number here (`5.0`, `-3`, `1e6`); fractions are
/// truncated toward zero before clamping.
pub fn clamp_num_results(requested: Option<f64>) -> u32 {
    match requested {
        Some(n) if n.is_finite() => n.trunc().clamp(MIN_RESULTS as f64, MAX_RESULTS as f64) as u32,
        _ => DEFAULT_NUM_RESULTS,
    }
}

/// Search mode understood by Exa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Let Exa blend neural and keyword retrieval.
    #[default]
    Auto,
    Neural,
    Keyword,
}

/// Body of `POST /search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(rename = "type")]
    pub search_type: SearchType,
    pub num_results: u32,
    pub use_autoprompt: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_published_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_domains: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SearchRequest {
    /// A plain search with no filters.  `num_results` is clamped.
    pub fn new(query: impl Into<String>, search_type: SearchType, num_results: u32) -> Self {
        Self {
            query: query.into(),
            search_type,
            num_results: num_results.clamp(MIN_RESULTS, MAX_RESULTS),
            use_autoprompt: true,
            start_published_date: None,
            end_published_date: None,
            include_domains: None,
            exclude_domains: None,
            category: None,
        }
    }
}

/// Body of `POST /contents`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentsRequest {
    pub urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<bool>,
}

impl ContentsRequest {
    /// Fetch full page text for `urls` and nothing else.
    pub fn text_only(urls: Vec<String>) -> Self {
        Self {
            urls,
            text: Some(true),
            summary: None,
            highlights: None,
        }
    }
}

/// Inline contents selection for `POST /findSimilar`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextContents {
    pub text: bool,
}

/// Body of `POST /findSimilar`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindSimilarRequest {
    pub url: String,
    pub num_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<TextContents>,
}

/// One result as returned by Exa.  Every field except `url` is optional
/// and read defensively; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub highlights: Option<Vec<String>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Response shared by `/search`, `/contents` and `/findSimilar`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub results: Vec<ResultRecord>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl SearchResponse {
    /// URLs of every result, in provider order.
    pub fn urls(&self) -> Vec<String> {
        self.results.iter().map(|r| r.url.clone()).collect()
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The three provider operations this service forwards to.
///
/// The API key travels with each call so one client can serve every
/// workspace.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, api_key: &str, request: &SearchRequest) -> anyhow::Result<SearchResponse>;

    async fn get_contents(
        &self,
        api_key: &str,
        request: &ContentsRequest,
    ) -> anyhow::Result<SearchResponse>;

    async fn find_similar(
        &self,
        api_key: &str,
        request: &FindSimilarRequest,
    ) -> anyhow::Result<SearchResponse>;
}
