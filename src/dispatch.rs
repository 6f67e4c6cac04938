//! Search dispatch: credential → provider call(s) → formatted text.
//!
//! Every operation returns text.  Provider failures are folded into an
//! `"Error performing <operation>: <cause>"` string instead of being
//! propagated, so a capability invocation never fails because Exa did.

use std::sync::Arc;

use tracing::{info, warn};

use crate::capabilities::args::{AdvancedSearchArgs, FindSimilarArgs, GetContentsArgs, SearchArgs};
use crate::credentials::CredentialResolver;
use crate::exa::{
    clamp_num_results, ContentsRequest, FindSimilarRequest, SearchProvider, SearchRequest,
    TextContents,
};
use crate::format::format_results;
use crate::workspace::WorkspaceId;

pub struct SearchDispatcher {
    credentials: Arc<CredentialResolver>,
    provider: Arc<dyn SearchProvider>,
}

impl SearchDispatcher {
    pub fn new(credentials: Arc<CredentialResolver>, provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            credentials,
            provider,
        }
    }

    /// Plain search, optionally followed by a full-text contents pass.
    pub async fn basic_search(&self, workspace: WorkspaceId, args: SearchArgs) -> String {
        let request = SearchRequest::new(
            args.query,
            args.search_type.unwrap_or_default(),
            clamp_num_results(args.num_results),
        );
        let include_text = args.include_text.unwrap_or(false);
        self.run_search("search", workspace, request, include_text)
            .await
    }

    /// Search with date, domain and category filters.  Filters are only
    /// forwarded when the caller supplied them.
    pub async fn advanced_search(&self, workspace: WorkspaceId, args: AdvancedSearchArgs) -> String {
        let mut request = SearchRequest::new(
            args.query,
            args.search_type.unwrap_or_default(),
            clamp_num_results(args.num_results),
        );
        request.start_published_date = non_empty(args.start_date);
        request.end_published_date = non_empty(args.end_date);
        request.include_domains = args.include_domains;
        request.exclude_domains = args.exclude_domains;
        request.category = non_empty(args.category);

        let include_text = args.include_text.unwrap_or(false);
        self.run_search("advanced search", workspace, request, include_text)
            .await
    }

    /// Fetch contents for an explicit URL list.  Text defaults to on;
    /// summary and highlights default to off.
    pub async fn content_fetch(&self, workspace: WorkspaceId, args: GetContentsArgs) -> String {
        let include_text = args.include_text.unwrap_or(true);
        let request = ContentsRequest {
            urls: args.urls,
            text: include_text.then_some(true),
            summary: args.include_summary.unwrap_or(false).then_some(true),
            highlights: args.include_highlights.unwrap_or(false).then_some(true),
        };

        let key = self.credentials.resolve(workspace).await.key;
        match self.provider.get_contents(&key, &request).await {
            Ok(response) => {
                info!(workspace, results = response.results.len(), "contents fetched");
                format_results(&response.results, include_text)
            }
            Err(e) => operation_error("content retrieval", workspace, &e),
        }
    }

    /// Pages similar to one seed URL.  Text, when wanted, is requested
    /// inline rather than through a second call.
    pub async fn similarity_search(&self, workspace: WorkspaceId, args: FindSimilarArgs) -> String {
        let include_text = args.include_text.unwrap_or(false);
        let request = FindSimilarRequest {
            url: args.url,
            num_results: clamp_num_results(args.num_results),
            contents: include_text.then_some(TextContents { text: true }),
        };

        let key = self.credentials.resolve(workspace).await.key;
        match self.provider.find_similar(&key, &request).await {
            Ok(response) => {
                info!(workspace, results = response.results.len(), "similar pages found");
                format_results(&response.results, include_text)
            }
            Err(e) => operation_error("similarity search", workspace, &e),
        }
    }

    async fn run_search(
        &self,
        operation: &str,
        workspace: WorkspaceId,
        request: SearchRequest,
        include_text: bool,
    ) -> String {
        match self.search_then_fetch(workspace, &request, include_text).await {
            Ok(text) => text,
            Err(e) => operation_error(operation, workspace, &e),
        }
    }

    async fn search_then_fetch(
        &self,
        workspace: WorkspaceId,
        request: &SearchRequest,
        include_text: bool,
    ) -> anyhow::Result<String> {
        let key = self.credentials.resolve(workspace).await.key;
        let response = self.provider.search(&key, request).await?;
        info!(workspace, results = response.results.len(), "search completed");

        if !include_text || response.results.is_empty() {
            return Ok(format_results(&response.results, false));
        }

        let contents = self
            .provider
            .get_contents(&key, &ContentsRequest::text_only(response.urls()))
            .await?;
        Ok(format_results(&contents.results, true))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn operation_error(operation: &str, workspace: WorkspaceId, err: &anyhow::Error) -> String {
    warn!(workspace, operation, error = %format!("{err:#}"), "provider call failed");
    format!("Error performing {operation}: {err:#}")
}
