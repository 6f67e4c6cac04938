//! ExaAgent end to end: capability names and args in, text out, with the
//! real Exa client pointed at a wiremock server.

use std::sync::Arc;
use std::time::Duration;

use exa_agent::capabilities::{ExaAgent, KEY_SAVED, NO_WORKSPACE, NO_WORKSPACE_RETRY};
use exa_agent::credentials::KeyStatus;
use exa_agent::exa::ExaClient;
use exa_agent::workspace::MemoryStore;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn agent(server: &MockServer, default_key: &str) -> ExaAgent {
    let client = ExaClient::new(server.uri(), Duration::from_secs(5)).unwrap();
    ExaAgent::new(Arc::new(MemoryStore::new()), Arc::new(client), default_key)
}

#[tokio::test]
async fn set_then_check_key() {
    let server = MockServer::start().await;
    let agent = agent(&server, "");

    let out = agent.call("checkExaApiKey", Some(1), json!({})).await.unwrap();
    assert_eq!(out, KeyStatus::Missing.message());

    let out = agent
        .call("setExaApiKey", Some(1), json!({"apiKey": "abc"}))
        .await
        .unwrap();
    assert_eq!(out, KEY_SAVED);

    let out = agent.call("checkExaApiKey", Some(1), json!({})).await.unwrap();
    assert_eq!(out, KeyStatus::Workspace.message());

    // Other workspaces are unaffected.
    let out = agent.call("checkExaApiKey", Some(2), json!(null)).await.unwrap();
    assert_eq!(out, KeyStatus::Missing.message());
}

#[tokio::test]
async fn default_key_is_reported() {
    let server = MockServer::start().await;
    let agent = agent(&server, "env-key");

    let out = agent.call("checkExaApiKey", Some(9), json!({})).await.unwrap();
    assert_eq!(out, KeyStatus::Default.message());
}

#[tokio::test]
async fn missing_workspace_messages() {
    let server = MockServer::start().await;
    let agent = agent(&server, "k");

    let out = agent
        .call("setExaApiKey", None, json!({"apiKey": "abc"}))
        .await
        .unwrap();
    assert_eq!(out, NO_WORKSPACE);

    let out = agent.call("checkExaApiKey", None, json!({})).await.unwrap();
    assert_eq!(out, NO_WORKSPACE);

    for (name, args) in [
        ("search", json!({"query": "q"})),
        ("getContents", json!({"urls": ["https://a.example"]})),
        ("findSimilar", json!({"url": "https://a.example"})),
        ("advancedSearch", json!({"query": "q"})),
    ] {
        let out = agent.call(name, None, args).await.unwrap();
        assert_eq!(out, NO_WORKSPACE_RETRY, "{name}");
    }

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_capability_and_bad_args_are_errors() {
    let server = MockServer::start().await;
    let agent = agent(&server, "k");

    let err = agent.call("deleteEverything", Some(1), json!({})).await.unwrap_err();
    assert!(err.to_string().contains("unknown capability"));

    let err = agent.call("search", Some(1), json!({})).await.unwrap_err();
    assert!(format!("{err:#}").contains("search: invalid arguments"));

    let err = agent
        .call("search", Some(1), json!({"query": "q", "type": "fuzzy"}))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("invalid arguments"));
}

#[tokio::test]
async fn search_uses_workspace_key_and_formats_results() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header("x-api-key", "ws-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "title": "Exa",
                "url": "https://exa.ai",
                "publishedDate": "2024-05-01",
                "author": "Exa Labs",
                "highlights": [" neural search "]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let agent = agent(&server, "default-key");
    agent
        .call("setExaApiKey", Some(5), json!({"apiKey": "ws-key"}))
        .await
        .unwrap();

    let out = agent
        .call("search", Some(5), json!({"query": "exa"}))
        .await
        .unwrap();
    assert_eq!(
        out,
        "[1] Exa\nURL: https://exa.ai\nPublished: 2024-05-01\nAuthor: Exa Labs\n\nHighlights:\n  - neural search"
    );
}

#[tokio::test]
async fn provider_failure_is_folded_into_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let agent = agent(&server, "k");
    let out = agent
        .call("advancedSearch", Some(1), json!({"query": "q", "includeDomains": ["a.com"]}))
        .await
        .unwrap();
    assert!(out.starts_with("Error performing advanced search: "), "{out}");
    assert!(out.contains("upstream down"), "{out}");
}

#[tokio::test]
async fn search_with_text_fetches_contents() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "Long", "url": "https://long.example"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let long_text = "x".repeat(800);
    Mock::given(method("POST"))
        .and(path("/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "Long", "url": "https://long.example", "text": long_text}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let agent = agent(&server, "k");
    let out = agent
        .call("search", Some(1), json!({"query": "q", "includeText": true}))
        .await
        .unwrap();

    let expected_preview = format!("  {}... [text truncated]", "x".repeat(500));
    assert!(out.ends_with(&expected_preview), "{out}");
}
