//! `setExaApiKey` / `checkExaApiKey`.

use tracing::{info, warn};

use super::args::SetApiKeyArgs;
use super::NO_WORKSPACE;
use crate::credentials::CredentialResolver;
use crate::workspace::WorkspaceId;

/// Confirmation returned after a key is stored.
pub const KEY_SAVED: &str = "Your Exa API key has been securely saved for this workspace. You can now use the search capabilities. Your API key is only stored in your workspace and not accessible to other users.";

pub(super) async fn set_exa_api_key(
    credentials: &CredentialResolver,
    workspace: Option<WorkspaceId>,
    args: SetApiKeyArgs,
) -> String {
    let Some(workspace) = workspace else {
        return NO_WORKSPACE.to_string();
    };

    match credentials.store(workspace, &args.api_key).await {
        Ok(()) => {
            info!(workspace, "workspace API key saved");
            KEY_SAVED.to_string()
        }
        Err(e) => {
            warn!(workspace, error = %format!("{e:#}"), "failed to save API key");
            format!("Error saving API key: {e:#}")
        }
    }
}

pub(super) async fn check_exa_api_key(
    credentials: &CredentialResolver,
    workspace: Option<WorkspaceId>,
) -> String {
    let Some(workspace) = workspace else {
        return NO_WORKSPACE.to_string();
    };
    credentials.check(workspace).await.message().to_string()
}
