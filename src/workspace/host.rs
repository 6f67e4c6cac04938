//! [`WorkspaceStore`] backed by the agent host's workspace file API.
//!
//! - `GET  {base}/workspaces/{id}/files` lists `{ path, fullUrl }` entries;
//!   reading an object fetches the `fullUrl` of the entry whose `path`
//!   matches the key.
//! - `POST {base}/workspaces/{id}/file` uploads a multipart form with
//!   `path`, `skipSummarizer` and the `file` bytes.
//!
//! Requests authenticate with the `x-openserv-key` header.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{validate_key, PutOptions, WorkspaceId, WorkspaceStore};

/// Default host API endpoint.
pub const DEFAULT_HOST_URL: &str = "https://api.openserv.ai";

const AUTH_HEADER: &str = "x-openserv-key";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HostFile {
    path: String,
    #[serde(default)]
    full_url: Option<String>,
}

pub struct HostStore {
    base_url: String,
    api_key: String,
    client: Client,
}

impl HostStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    async fn list_files(&self, workspace: WorkspaceId) -> anyhow::Result<Vec<HostFile>> {
        let url = format!("{}/workspaces/{workspace}/files", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header(AUTH_HEADER, &self.api_key)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("host file listing returned {status}: {text}");
        }

        resp.json().await.context("failed to decode host file listing")
    }
}

#[async_trait]
impl WorkspaceStore for HostStore {
    async fn get(&self, workspace: WorkspaceId, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let files = self.list_files(workspace).await?;
        let Some(full_url) = files
            .into_iter()
            .find(|f| f.path == key)
            .and_then(|f| f.full_url)
        else {
            return Ok(None);
        };

        debug!(workspace, key, "fetching host workspace file");
        let resp = self
            .client
            .get(&full_url)
            .send()
            .await
            .with_context(|| format!("fetching {key} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("fetching {key} returned {status}");
        }

        let bytes = resp
            .bytes()
            .await
            .with_context(|| format!("reading {key} failed"))?;
        Ok(Some(bytes.to_vec()))
    }

    async fn put(
        &self,
        workspace: WorkspaceId,
        key: &str,
        bytes: Vec<u8>,
        opts: PutOptions,
    ) -> anyhow::Result<()> {
        validate_key(key)?;
        let url = format!("{}/workspaces/{workspace}/file", self.base_url);
        let form = Form::new()
            .text("path", key.to_string())
            .text("skipSummarizer", opts.skip_summarizer.to_string())
            .part("file", Part::bytes(bytes).file_name(key.to_string()));

        let resp = self
            .client
            .post(&url)
            .header(AUTH_HEADER, &self.api_key)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("host file upload returned {status}: {text}");
        }

        debug!(workspace, key, "host workspace file uploaded");
        Ok(())
    }
}
