use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{validate_key, PutOptions, WorkspaceId, WorkspaceStore};

/// In-memory [`WorkspaceStore`].  Contents vanish with the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(WorkspaceId, String), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

#[async_trait]
impl WorkspaceStore for MemoryStore {
    async fn get(&self, workspace: WorkspaceId, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("workspace store poisoned"))?;
        Ok(entries.get(&(workspace, key.to_string())).cloned())
    }

    async fn put(
        &self,
        workspace: WorkspaceId,
        key: &str,
        bytes: Vec<u8>,
        _opts: PutOptions,
    ) -> anyhow::Result<()> {
        validate_key(key)?;
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("workspace store poisoned"))?;
        entries.insert((workspace, key.to_string()), bytes);
        Ok(())
    }
}
