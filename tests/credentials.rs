//! Credential resolution over the filesystem store and a failing store.

use std::sync::Arc;

use async_trait::async_trait;
use exa_agent::credentials::{CredentialResolver, Fallback, KeySource, KeyStatus, CONFIG_PATH};
use exa_agent::workspace::{FsStore, PutOptions, WorkspaceId, WorkspaceStore};

struct BrokenStore;

#[async_trait]
impl WorkspaceStore for BrokenStore {
    async fn get(&self, _: WorkspaceId, _: &str) -> anyhow::Result<Option<Vec<u8>>> {
        anyhow::bail!("storage offline")
    }

    async fn put(&self, _: WorkspaceId, _: &str, _: Vec<u8>, _: PutOptions) -> anyhow::Result<()> {
        anyhow::bail!("storage offline")
    }
}

#[tokio::test]
async fn store_then_resolve_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(FsStore::new(tmp.path()));
    let resolver = CredentialResolver::new(store.clone(), "default");

    resolver.store(42, "abc").await.unwrap();

    let resolved = resolver.resolve(42).await;
    assert_eq!(resolved.key, "abc");
    assert_eq!(resolved.source, KeySource::Workspace);

    let on_disk = std::fs::read_to_string(tmp.path().join("42").join(CONFIG_PATH)).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&on_disk).unwrap();
    assert_eq!(parsed, serde_json::json!({"apiKey": "abc"}));
}

#[tokio::test]
async fn later_store_wins() {
    let tmp = tempfile::tempdir().unwrap();
    let resolver = CredentialResolver::new(Arc::new(FsStore::new(tmp.path())), "");

    resolver.store(1, "first").await.unwrap();
    resolver.store(1, "second").await.unwrap();
    assert_eq!(resolver.resolve(1).await.key, "second");
}

#[tokio::test]
async fn hand_edited_config_is_tolerated() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("7");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(CONFIG_PATH), "{ not json").unwrap();

    let resolver = CredentialResolver::new(Arc::new(FsStore::new(tmp.path())), "fallback");
    let resolved = resolver.resolve(7).await;
    assert_eq!(resolved.key, "fallback");
    assert!(matches!(
        resolved.source,
        KeySource::Default(Fallback::InvalidConfig(_))
    ));
    assert_eq!(resolver.check(7).await, KeyStatus::Default);
}

#[tokio::test]
async fn unreadable_store_falls_back_to_default() {
    let resolver = CredentialResolver::new(Arc::new(BrokenStore), "fallback");

    let resolved = resolver.resolve(1).await;
    assert_eq!(resolved.key, "fallback");
    let KeySource::Default(Fallback::StoreError(reason)) = resolved.source else {
        panic!("expected a store error fallback");
    };
    assert!(reason.contains("storage offline"));

    let err = resolver.store(1, "abc").await.unwrap_err();
    assert!(format!("{err:#}").contains("storage offline"));
}

#[tokio::test]
async fn missing_everything_reports_missing() {
    let tmp = tempfile::tempdir().unwrap();
    let resolver = CredentialResolver::new(Arc::new(FsStore::new(tmp.path())), "");

    let resolved = resolver.resolve(3).await;
    assert_eq!(resolved.key, "");
    assert_eq!(resolved.source, KeySource::Default(Fallback::NotConfigured));
    assert_eq!(resolver.check(3).await, KeyStatus::Missing);
    assert!(resolver
        .check(3)
        .await
        .message()
        .starts_with("No Exa API key is configured for this workspace."));
}
