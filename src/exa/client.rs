//! reqwest-backed Exa client.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::{ContentsRequest, FindSimilarRequest, SearchProvider, SearchRequest, SearchResponse};

/// Public Exa API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.exa.ai";

/// Talks to the Exa REST API.  Holds no credential of its own; each call
/// authenticates with the key it is given.
pub struct ExaClient {
    base_url: String,
    client: Client,
}

impl ExaClient {
    /// Create a client for `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    #[cfg(test)]
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        api_key: &str,
        path: &str,
        body: &B,
    ) -> anyhow::Result<SearchResponse> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "exa request");

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Exa API returned {status}: {text}");
        }

        let parsed: SearchResponse = resp
            .json()
            .await
            .context("failed to decode Exa response")?;
        debug!(
            %url,
            results = parsed.results.len(),
            request_id = parsed.request_id.as_deref().unwrap_or(""),
            "exa response"
        );
        Ok(parsed)
    }
}

#[async_trait]
impl SearchProvider for ExaClient {
    async fn search(&self, api_key: &str, request: &SearchRequest) -> anyhow::Result<SearchResponse> {
        self.post(api_key, "search", request).await
    }

    async fn get_contents(
        &self,
        api_key: &str,
        request: &ContentsRequest,
    ) -> anyhow::Result<SearchResponse> {
        self.post(api_key, "contents", request).await
    }

    async fn find_similar(
        &self,
        api_key: &str,
        request: &FindSimilarRequest,
    ) -> anyhow::Result<SearchResponse> {
        self.post(api_key, "findSimilar", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exa::SearchType;

    #[test]
    fn trailing_slash_is_trimmed() {
        let c = ExaClient::new("https://api.exa.ai/", Duration::from_secs(5)).unwrap();
        assert_eq!(c.base_url(), "https://api.exa.ai");
    }

    #[tokio::test]
    async fn search_fails_without_server() {
        let c = ExaClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let req = SearchRequest::new("q", SearchType::Auto, 5);
        let err = c.search("key", &req).await.unwrap_err();
        assert!(format!("{err:#}").contains("request to http://127.0.0.1:1/search failed"));
    }
}
