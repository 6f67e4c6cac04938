//! Search capabilities: thin workspace checks in front of the dispatcher.

use super::args::{AdvancedSearchArgs, FindSimilarArgs, GetContentsArgs, SearchArgs};
use super::NO_WORKSPACE_RETRY;
use crate::dispatch::SearchDispatcher;
use crate::workspace::WorkspaceId;

pub(super) async fn search(
    dispatcher: &SearchDispatcher,
    workspace: Option<WorkspaceId>,
    args: SearchArgs,
) -> String {
    match workspace {
        Some(ws) => dispatcher.basic_search(ws, args).await,
        None => NO_WORKSPACE_RETRY.to_string(),
    }
}

pub(super) async fn get_contents(
    dispatcher: &SearchDispatcher,
    workspace: Option<WorkspaceId>,
    args: GetContentsArgs,
) -> String {
    match workspace {
        Some(ws) => dispatcher.content_fetch(ws, args).await,
        None => NO_WORKSPACE_RETRY.to_string(),
    }
}

pub(super) async fn find_similar(
    dispatcher: &SearchDispatcher,
    workspace: Option<WorkspaceId>,
    args: FindSimilarArgs,
) -> String {
    match workspace {
        Some(ws) => dispatcher.similarity_search(ws, args).await,
        None => NO_WORKSPACE_RETRY.to_string(),
    }
}

pub(super) async fn advanced_search(
    dispatcher: &SearchDispatcher,
    workspace: Option<WorkspaceId>,
    args: AdvancedSearchArgs,
) -> String {
    match workspace {
        Some(ws) => dispatcher.advanced_search(ws, args).await,
        None => NO_WORKSPACE_RETRY.to_string(),
    }
}
