//! Per-workspace Exa API key resolution.
//!
//! A workspace may carry its own key in a small JSON object
//! (`{"apiKey": "..."}`) at [`CONFIG_PATH`].  Resolution never fails: any
//! problem reading or parsing that object falls back to the process-wide
//! default key, and the reason is kept in [`KeySource`] for diagnostics.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::workspace::{PutOptions, WorkspaceId, WorkspaceStore};

/// Logical path of the per-workspace key object.
pub const CONFIG_PATH: &str = ".exa_config";

/// Why resolution fell back to the default key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// No key object in the workspace.
    NotConfigured,
    /// The store could not be read.
    StoreError(String),
    /// The object is not valid UTF-8 JSON.
    InvalidConfig(String),
    /// The object parsed but has no usable `apiKey`.
    MissingKey,
}

/// Where a resolved key came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    Workspace,
    Default(Fallback),
}

/// Result of [`CredentialResolver::resolve`].  `key` may be empty when no
/// default is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub key: String,
    pub source: KeySource,
}

/// Three-way configuration status reported by `checkExaApiKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    /// Nothing configured anywhere.
    Missing,
    /// Falling back to the non-empty process-wide key.
    Default,
    /// A workspace-specific key is in effect.
    Workspace,
}

impl KeyStatus {
    pub fn message(self) -> &'static str {
        match self {
            KeyStatus::Missing => "No Exa API key is configured for this workspace. Please use the 'setExaApiKey' capability to set your API key if user gives you for example '12345678-1234-5678-1234-123456789012' you should write to the file EXA_API_KEY='12345678-1234-5678-1234-123456789012'). You can get a free API key from https://dashboard.exa.ai/api-keys.",
            KeyStatus::Default => "Using the default Exa API key. For personal usage, please set your own API key using the 'setExaApiKey' capability (if user gives you for example '12345678-1234-5678-1234-123456789012' you should write to the file EXA_API_KEY='12345678-1234-5678-1234-123456789012'). You can get a free API key from https://dashboard.exa.ai/api-keys.",
            KeyStatus::Workspace => "An Exa API key is configured for this workspace. You're ready to use the search capabilities.",
        }
    }
}

/// Reads and writes the per-workspace key through a [`WorkspaceStore`].
///
/// Nothing is cached: every call goes to the store.
pub struct CredentialResolver {
    storage: Arc<dyn WorkspaceStore>,
    default_key: String,
}

impl CredentialResolver {
    pub fn new(storage: Arc<dyn WorkspaceStore>, default_key: impl Into<String>) -> Self {
        Self {
            storage,
            default_key: default_key.into(),
        }
    }

    /// The process-wide fallback key (possibly empty).
    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// Resolve the key for `workspace`, falling back to the default.
    pub async fn resolve(&self, workspace: WorkspaceId) -> ResolvedKey {
        match self.read_workspace_key(workspace).await {
            Ok(key) => ResolvedKey {
                key,
                source: KeySource::Workspace,
            },
            Err(reason) => {
                match &reason {
                    Fallback::StoreError(e) => {
                        warn!(workspace, error = %e, "error retrieving workspace API key")
                    }
                    Fallback::InvalidConfig(e) => {
                        warn!(workspace, error = %e, "error parsing workspace key config")
                    }
                    Fallback::NotConfigured | Fallback::MissingKey => {
                        debug!(workspace, reason = ?reason, "using default API key")
                    }
                }
                ResolvedKey {
                    key: self.default_key.clone(),
                    source: KeySource::Default(reason),
                }
            }
        }
    }

    async fn read_workspace_key(&self, workspace: WorkspaceId) -> Result<String, Fallback> {
        let bytes = self
            .storage
            .get(workspace, CONFIG_PATH)
            .await
            .map_err(|e| Fallback::StoreError(format!("{e:#}")))?
            .ok_or(Fallback::NotConfigured)?;

        let config: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Fallback::InvalidConfig(e.to_string()))?;

        config
            .get("apiKey")
            .and_then(Value::as_str)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .ok_or(Fallback::MissingKey)
    }

    /// Persist `key` as the workspace's own key.
    pub async fn store(&self, workspace: WorkspaceId, key: &str) -> anyhow::Result<()> {
        let body = serde_json::to_vec(&serde_json::json!({ "apiKey": key }))?;
        self.storage
            .put(
                workspace,
                CONFIG_PATH,
                body,
                PutOptions {
                    skip_summarizer: true,
                },
            )
            .await?;
        debug!(workspace, "workspace API key stored");
        Ok(())
    }

    /// Classify the key currently in effect for `workspace`.
    pub async fn check(&self, workspace: WorkspaceId) -> KeyStatus {
        let resolved = self.resolve(workspace).await;
        if resolved.key != self.default_key {
            KeyStatus::Workspace
        } else if self.default_key.is_empty() {
            KeyStatus::Missing
        } else {
            KeyStatus::Default
        }
    }
}
