use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::capabilities::{list_capabilities, Capability, SYSTEM_PROMPT};
use crate::gateway::AppState;
use crate::workspace::WorkspaceId;

/// Body of `POST /tools/:name`, shaped the way the agent host sends it.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ToolCall {
    #[serde(default)]
    pub args: Value,
    #[serde(default)]
    pub action: Option<Action>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Action {
    #[serde(default)]
    pub workspace: Option<WorkspaceRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkspaceRef {
    pub id: WorkspaceId,
}

impl ToolCall {
    /// The calling workspace.  Id `0` is never assigned by the host and
    /// counts as missing.
    fn workspace(&self) -> Option<WorkspaceId> {
        self.action
            .as_ref()
            .and_then(|a| a.workspace.as_ref())
            .map(|w| w.id)
            .filter(|id| *id != 0)
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Decode the request envelope.  An empty body is an empty call; anything
/// else must be JSON and match [`ToolCall`].
fn decode_call(headers: &HeaderMap, body: &Bytes) -> Result<ToolCall, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ToolCall::default());
    }
    if !is_json_content_type(headers) {
        return Err("expected request with `Content-Type: application/json`".to_string());
    }
    Json::<ToolCall>::from_bytes(body)
        .map(|Json(call)| call)
        .map_err(|rejection| rejection.body_text())
}

/// `GET /tools`
pub(crate) async fn api_tools_list() -> impl IntoResponse {
    Json(serde_json::json!({
        "system_prompt": SYSTEM_PROMPT,
        "capabilities": list_capabilities(),
    }))
}

/// `POST /tools/:name`
pub(crate) async fn api_tool_call(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(capability) = Capability::from_name(&name) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("unknown capability: {name}")})),
        );
    };

    let call = match decode_call(&headers, &body) {
        Ok(call) => call,
        Err(error) => {
            warn!(capability = %name, %error, "malformed tool call body");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": error })),
            );
        }
    };
    let workspace = call.workspace();
    info!(capability = %name, ?workspace, "tool call");

    match state.agent.invoke(capability, workspace, call.args).await {
        Ok(result) => (StatusCode::OK, Json(serde_json::json!({ "result": result }))),
        Err(e) => {
            warn!(capability = %name, error = %format!("{e:#}"), "tool call rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": format!("{e:#}")})),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn json_headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn empty_body_is_an_empty_call() {
        let call = decode_call(&HeaderMap::new(), &Bytes::from_static(b"  ")).unwrap();
        assert!(call.args.is_null());
        assert_eq!(call.workspace(), None);
    }

    #[test]
    fn content_type_parameters_are_accepted() {
        let body = Bytes::from_static(br#"{"action":{"workspace":{"id":4}}}"#);
        let call = decode_call(&json_headers("application/json; charset=utf-8"), &body).unwrap();
        assert_eq!(call.workspace(), Some(4));
    }

    #[test]
    fn body_without_content_type_is_rejected() {
        let body = Bytes::from_static(br#"{"args":{}}"#);
        assert!(decode_call(&HeaderMap::new(), &body).is_err());
        assert!(decode_call(&json_headers("text/plain"), &body).is_err());
    }

    #[test]
    fn mistyped_envelope_is_rejected() {
        let body = Bytes::from_static(br#"{"args":{"apiKey":"abc"},"action":{"workspace":{"id":"12"}}}"#);
        assert!(decode_call(&json_headers("application/json"), &body).is_err());
    }

    #[test]
    fn workspace_zero_counts_as_missing() {
        let body = Bytes::from_static(br#"{"action":{"workspace":{"id":0}}}"#);
        let call = decode_call(&json_headers("application/json"), &body).unwrap();
        assert_eq!(call.workspace(), None);
    }
}
