//! Workspace-scoped key/value storage.
//!
//! The agent host owns workspace files; this crate only needs to read and
//! write a handful of small objects by logical path.  [`WorkspaceStore`]
//! is that narrow seam, with three backends:
//!
//! - [`MemoryStore`]: process-local map, for tests and throwaway runs.
//! - [`FsStore`]: one directory per workspace on local disk.
//! - [`HostStore`]: the host platform's workspace file API over HTTP.

mod fs;
mod host;
mod memory;

pub use fs::FsStore;
pub use host::{HostStore, DEFAULT_HOST_URL};
pub use memory::MemoryStore;

use async_trait::async_trait;

/// Identifier of a workspace as assigned by the host.
pub type WorkspaceId = u64;

/// Per-write flags forwarded to the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutOptions {
    /// Ask the host not to run its content summarizer over this object.
    pub skip_summarizer: bool,
}

/// Storage for small workspace-scoped objects addressed by logical path.
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Fetch the object at `key`.  `Ok(None)` means it does not exist.
    async fn get(&self, workspace: WorkspaceId, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Create or replace the object at `key`.
    async fn put(
        &self,
        workspace: WorkspaceId,
        key: &str,
        bytes: Vec<u8>,
        opts: PutOptions,
    ) -> anyhow::Result<()>;
}

/// Reject keys that could escape a workspace: empty, absolute, or
/// containing `..`, backslashes or NUL bytes.
pub(crate) fn validate_key(key: &str) -> anyhow::Result<()> {
    if key.is_empty() {
        anyhow::bail!("workspace key must not be empty");
    }
    if key.starts_with('/') || std::path::Path::new(key).is_absolute() {
        anyhow::bail!("absolute paths are not allowed: {key}");
    }
    if key.contains("..") {
        anyhow::bail!("path traversal ('..') is not allowed: {key}");
    }
    if key.contains('\\') || key.contains('\0') {
        anyhow::bail!("invalid workspace key: {key:?}");
    }
    Ok(())
}
