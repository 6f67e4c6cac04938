//! Capability catalogue and dispatcher.
//!
//! The set of capabilities is fixed at compile time: [`Capability`] maps
//! each name to its description, its argument schema and its handler.
//! [`ExaAgent`] owns the collaborators the handlers need and is the single
//! entry point used by the gateway and the CLI.

pub mod args;
mod api_key;
mod search;

pub use api_key::KEY_SAVED;

use std::sync::Arc;

use anyhow::Context;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::credentials::CredentialResolver;
use crate::dispatch::SearchDispatcher;
use crate::exa::SearchProvider;
use crate::workspace::{WorkspaceId, WorkspaceStore};

use args::{
    AdvancedSearchArgs, CheckApiKeyArgs, FindSimilarArgs, GetContentsArgs, SearchArgs,
    SetApiKeyArgs,
};

/// Returned by the key-management capabilities when no workspace is given.
pub const NO_WORKSPACE: &str = "Error: No workspace context provided.";

/// Returned by the search capabilities when no workspace is given.
pub const NO_WORKSPACE_RETRY: &str = "Error: No workspace context provided. Please try again.";

/// System prompt the host should give the agent driving these capabilities.
pub const SYSTEM_PROMPT: &str = "You are an advanced Exa search agent capable of performing web searches and retrieving content.
Exa is a powerful search engine that uses neural search to understand the meaning behind queries.
You can search for information, get contents of webpages, and find similar pages based on URLs.";

/// Metadata describing one capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityMeta {
    /// Name the host invokes the capability by (e.g. `"search"`).
    pub name: String,
    /// One-liner shown to the agent.
    pub description: String,
    /// JSON Schema of the expected `args` object.
    pub args_schema: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    SetExaApiKey,
    CheckExaApiKey,
    Search,
    GetContents,
    FindSimilar,
    AdvancedSearch,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::SetExaApiKey,
        Capability::CheckExaApiKey,
        Capability::Search,
        Capability::GetContents,
        Capability::FindSimilar,
        Capability::AdvancedSearch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Capability::SetExaApiKey => "setExaApiKey",
            Capability::CheckExaApiKey => "checkExaApiKey",
            Capability::Search => "search",
            Capability::GetContents => "getContents",
            Capability::FindSimilar => "findSimilar",
            Capability::AdvancedSearch => "advancedSearch",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn description(self) -> &'static str {
        match self {
            Capability::SetExaApiKey => "Set your personal Exa API key for search operations",
            Capability::CheckExaApiKey => {
                "Check if an Exa API key is configured for this workspace"
            }
            Capability::Search => "Perform a web search using Exa and return relevant results",
            Capability::GetContents => "Get clean, parsed content from specific URLs",
            Capability::FindSimilar => "Find pages similar to a given URL",
            Capability::AdvancedSearch => "Perform an advanced web search with filtering options",
        }
    }

    pub fn args_schema(self) -> Value {
        match self {
            Capability::SetExaApiKey => schema_of::<SetApiKeyArgs>(),
            Capability::CheckExaApiKey => schema_of::<CheckApiKeyArgs>(),
            Capability::Search => schema_of::<SearchArgs>(),
            Capability::GetContents => schema_of::<GetContentsArgs>(),
            Capability::FindSimilar => schema_of::<FindSimilarArgs>(),
            Capability::AdvancedSearch => schema_of::<AdvancedSearchArgs>(),
        }
    }

    pub fn meta(self) -> CapabilityMeta {
        CapabilityMeta {
            name: self.name().to_string(),
            description: self.description().to_string(),
            args_schema: self.args_schema(),
        }
    }
}

/// Metadata for every capability, in catalogue order.
pub fn list_capabilities() -> Vec<CapabilityMeta> {
    Capability::ALL.into_iter().map(Capability::meta).collect()
}

fn schema_of<T: JsonSchema>() -> Value {
    serde_json::to_value(schemars::schema_for!(T)).unwrap_or(Value::Null)
}

fn decode<T: DeserializeOwned>(capability: Capability, args: Value) -> anyhow::Result<T> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args)
        .with_context(|| format!("{}: invalid arguments", capability.name()))
}

/// Runs capabilities against a workspace store and a search provider.
pub struct ExaAgent {
    credentials: Arc<CredentialResolver>,
    dispatcher: SearchDispatcher,
}

impl ExaAgent {
    pub fn new(
        store: Arc<dyn WorkspaceStore>,
        provider: Arc<dyn SearchProvider>,
        default_key: impl Into<String>,
    ) -> Self {
        let credentials = Arc::new(CredentialResolver::new(store, default_key));
        let dispatcher = SearchDispatcher::new(credentials.clone(), provider);
        Self {
            credentials,
            dispatcher,
        }
    }

    pub fn credentials(&self) -> &CredentialResolver {
        &self.credentials
    }

    /// Invoke a capability by name.
    ///
    /// Errors only for unknown names and arguments that do not match the
    /// capability's schema; everything past decoding yields text.
    pub async fn call(
        &self,
        name: &str,
        workspace: Option<WorkspaceId>,
        args: Value,
    ) -> anyhow::Result<String> {
        let capability =
            Capability::from_name(name).ok_or_else(|| anyhow::anyhow!("unknown capability: {name}"))?;
        self.invoke(capability, workspace, args).await
    }

    pub async fn invoke(
        &self,
        capability: Capability,
        workspace: Option<WorkspaceId>,
        args: Value,
    ) -> anyhow::Result<String> {
        debug!(capability = capability.name(), ?workspace, "invoking capability");
        let output = match capability {
            Capability::SetExaApiKey => {
                api_key::set_exa_api_key(&self.credentials, workspace, decode(capability, args)?)
                    .await
            }
            Capability::CheckExaApiKey => {
                let _: CheckApiKeyArgs = decode(capability, args)?;
                api_key::check_exa_api_key(&self.credentials, workspace).await
            }
            Capability::Search => {
                search::search(&self.dispatcher, workspace, decode(capability, args)?).await
            }
            Capability::GetContents => {
                search::get_contents(&self.dispatcher, workspace, decode(capability, args)?).await
            }
            Capability::FindSimilar => {
                search::find_similar(&self.dispatcher, workspace, decode(capability, args)?).await
            }
            Capability::AdvancedSearch => {
                search::advanced_search(&self.dispatcher, workspace, decode(capability, args)?)
                    .await
            }
        };
        Ok(output)
    }
}
