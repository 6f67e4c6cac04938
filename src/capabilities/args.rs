//! Typed argument objects for every capability.
//!
//! Field names follow the host's camelCase convention.  Doc comments on
//! fields become `description`s in the generated JSON schemas.  Unknown
//! fields are ignored.

use schemars::JsonSchema;
use serde::Deserialize;

use crate::exa::SearchType;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetApiKeyArgs {
    /// Your Exa API key from dashboard.exa.ai
    pub api_key: String,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CheckApiKeyArgs {}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchArgs {
    /// The search query
    pub query: String,
    /// The type of search to perform
    #[serde(default, rename = "type")]
    pub search_type: Option<SearchType>,
    /// Number of results to return
    #[serde(default)]
    #[schemars(range(min = 1, max = 25))]
    pub num_results: Option<f64>,
    /// Whether to include full text of results
    #[serde(default)]
    pub include_text: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetContentsArgs {
    /// Array of URLs to get content from
    pub urls: Vec<String>,
    /// Whether to include full text
    #[serde(default)]
    pub include_text: Option<bool>,
    /// Whether to include AI-generated summary
    #[serde(default)]
    pub include_summary: Option<bool>,
    /// Whether to include relevant highlights
    #[serde(default)]
    pub include_highlights: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindSimilarArgs {
    /// The URL to find similar pages for
    pub url: String,
    /// Number of results to return
    #[serde(default)]
    #[schemars(range(min = 1, max = 25))]
    pub num_results: Option<f64>,
    /// Whether to include full text of results
    #[serde(default)]
    pub include_text: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSearchArgs {
    /// The search query
    pub query: String,
    /// The type of search to perform
    #[serde(default, rename = "type")]
    pub search_type: Option<SearchType>,
    /// Number of results to return
    #[serde(default)]
    #[schemars(range(min = 1, max = 25))]
    pub num_results: Option<f64>,
    /// Whether to include full text of results
    #[serde(default)]
    pub include_text: Option<bool>,
    /// Filter results published after this date (YYYY-MM-DD)
    #[serde(default)]
    pub start_date: Option<String>,
    /// Filter results published before this date (YYYY-MM-DD)
    #[serde(default)]
    pub end_date: Option<String>,
    /// Only include results from these domains
    #[serde(default)]
    pub include_domains: Option<Vec<String>>,
    /// Exclude results from these domains
    #[serde(default)]
    pub exclude_domains: Option<Vec<String>>,
    /// Filter by category (e.g., "research paper", "news", "company")
    #[serde(default)]
    pub category: Option<String>,
}
