use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

use super::{validate_key, PutOptions, WorkspaceId, WorkspaceStore};

/// Filesystem-backed [`WorkspaceStore`].
///
/// Objects live at `<root>/<workspace_id>/<key>`.  Keys are validated so
/// they cannot leave their workspace directory.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding every object of `workspace`.
    fn workspace_dir(&self, workspace: WorkspaceId) -> PathBuf {
        self.root.join(workspace.to_string())
    }

    fn object_path(&self, workspace: WorkspaceId, key: &str) -> anyhow::Result<PathBuf> {
        validate_key(key)?;
        Ok(self.workspace_dir(workspace).join(key))
    }
}

#[async_trait]
impl WorkspaceStore for FsStore {
    async fn get(&self, workspace: WorkspaceId, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let path = self.object_path(workspace, key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("cannot read {}", path.display())),
        }
    }

    async fn put(
        &self,
        workspace: WorkspaceId,
        key: &str,
        bytes: Vec<u8>,
        opts: PutOptions,
    ) -> anyhow::Result<()> {
        let path = self.object_path(workspace, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("cannot write {}", path.display()))?;
        debug!(
            path = %path.display(),
            bytes = bytes.len(),
            skip_summarizer = opts.skip_summarizer,
            "workspace object written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_object_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        assert!(store.get(3, ".exa_config").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn put_creates_workspace_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        store
            .put(3, "nested/obj.json", b"{}".to_vec(), PutOptions::default())
            .await
            .unwrap();
        let on_disk = std::fs::read(dir.path().join("3/nested/obj.json")).unwrap();
        assert_eq!(on_disk, b"{}");
        assert_eq!(
            store.get(3, "nested/obj.json").await.unwrap().as_deref(),
            Some(&b"{}"[..])
        );
    }

    #[tokio::test]
    async fn traversal_is_blocked() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let result = store
            .put(3, "../4/.exa_config", b"{}".to_vec(), PutOptions::default())
            .await;
        assert!(result.is_err());
        assert!(store.get(3, "/etc/hostname").await.is_err());
    }
}
