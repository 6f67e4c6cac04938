use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::exa::DEFAULT_BASE_URL;
use crate::workspace::DEFAULT_HOST_URL;

/// Port the gateway listens on when neither the file nor `PORT` sets one.
pub const DEFAULT_PORT: u16 = 7378;

/// Top-level configuration loaded from `config.yaml`.
///
/// Every section is optional; a missing file yields [`Config::default`].
/// Environment variables override file values (see
/// [`Config::apply_env_overrides`]).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub exa: ExaConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

/// Exa provider settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExaConfig {
    /// Process-wide default key (plain text or env-var reference like
    /// `$EXA_API_KEY`).  Used when a workspace has no key of its own.
    #[serde(default)]
    pub api_key: Option<String>,
    /// API endpoint.
    #[serde(default = "default_exa_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_exa_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// HTTP gateway settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer token required on `/tools` routes.  Unset disables auth.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_token: None,
        }
    }
}

/// Which [`WorkspaceStore`](crate::workspace::WorkspaceStore) backs
/// per-workspace objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Fs,
    Memory,
    Host,
}

/// Workspace storage settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Root directory for the `fs` backend.  Defaults to
    /// `<agent_home>/workspaces`.
    #[serde(default)]
    pub root: Option<String>,
    /// Host API endpoint for the `host` backend.
    #[serde(default = "default_host_url")]
    pub host_url: String,
    /// Host API key for the `host` backend (plain or `$ENV_VAR`).
    #[serde(default)]
    pub host_api_key: Option<String>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            root: None,
            host_url: default_host_url(),
            host_api_key: None,
        }
    }
}

fn default_exa_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_host_url() -> String {
    DEFAULT_HOST_URL.to_string()
}

/// Expand a `$VAR` reference through `lookup`; anything else is returned
/// as-is.  Unset variables expand to the empty string.
fn expand_env_ref(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    match raw.strip_prefix('$') {
        Some(var) if !var.is_empty() => lookup(var).unwrap_or_default(),
        _ => raw.to_string(),
    }
}

impl Config {
    /// Read and parse a YAML configuration file, then apply environment
    /// overrides and validate.
    pub async fn load(path: &Path) -> anyhow::Result<Config> {
        let mut config = match tokio::fs::read_to_string(path).await {
            Ok(contents) => Self::parse(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Config::default()
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read config file: {}", path.display()));
            }
        };

        config.apply_env_overrides(|k| std::env::var(k).ok())?;
        config.validate()?;

        tracing::debug!(
            backend = ?config.workspace.backend,
            port = config.gateway.port,
            default_key = !config.default_api_key().is_empty(),
            "configuration loaded"
        );

        Ok(config)
    }

    /// Parse YAML text without touching the environment.
    pub fn parse(contents: &str) -> anyhow::Result<Config> {
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml_ng::from_str(contents).context("failed to parse config YAML")
    }

    /// Override file values from the environment:
    ///
    /// | variable | field |
    /// |---|---|
    /// | `EXA_API_KEY` | `exa.api_key` |
    /// | `EXA_BASE_URL` | `exa.base_url` |
    /// | `PORT` | `gateway.port` |
    /// | `EXA_AGENT_API_TOKEN` | `gateway.api_token` |
    /// | `OPENSERV_API_KEY` | `workspace.host_api_key` |
    /// | `EXA_AGENT_STORE` | `workspace.backend` |
    pub fn apply_env_overrides(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        let set = |k: &str| env(k).filter(|v| !v.is_empty());

        if let Some(v) = set("EXA_API_KEY") {
            self.exa.api_key = Some(v);
        }
        if let Some(v) = set("EXA_BASE_URL") {
            self.exa.base_url = v;
        }
        if let Some(v) = set("PORT") {
            self.gateway.port = v
                .trim()
                .parse()
                .with_context(|| format!("invalid PORT value: {v}"))?;
        }
        if let Some(v) = set("EXA_AGENT_API_TOKEN") {
            self.gateway.api_token = Some(v);
        }
        if let Some(v) = set("OPENSERV_API_KEY") {
            self.workspace.host_api_key = Some(v);
        }
        if let Some(v) = set("EXA_AGENT_STORE") {
            self.workspace.backend = serde_yaml_ng::from_str(&v)
                .with_context(|| format!("invalid EXA_AGENT_STORE value: {v}"))?;
        }
        Ok(())
    }

    /// Validate semantic constraints that serde cannot enforce.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.exa.base_url.starts_with("http://") && !self.exa.base_url.starts_with("https://") {
            anyhow::bail!("config: exa.base_url must be an http(s) URL: {}", self.exa.base_url);
        }
        if self.exa.timeout_secs == 0 {
            anyhow::bail!("config: exa.timeout_secs must be greater than zero");
        }
        if self.workspace.backend == StoreBackend::Host && self.host_api_key().is_empty() {
            anyhow::bail!(
                "config: workspace.backend = host requires workspace.host_api_key (or OPENSERV_API_KEY)"
            );
        }
        Ok(())
    }

    /// The process-wide default Exa key; empty when none is configured.
    pub fn default_api_key(&self) -> String {
        self.exa
            .api_key
            .as_deref()
            .map(|k| expand_env_ref(k, |v| std::env::var(v).ok()))
            .unwrap_or_default()
    }

    /// The host API key; empty when none is configured.
    pub fn host_api_key(&self) -> String {
        self.workspace
            .host_api_key
            .as_deref()
            .map(|k| expand_env_ref(k, |v| std::env::var(v).ok()))
            .unwrap_or_default()
    }

    pub fn exa_timeout(&self) -> Duration {
        Duration::from_secs(self.exa.timeout_secs)
    }

    pub fn gateway_addr(&self) -> anyhow::Result<SocketAddr> {
        let raw = format!("{}:{}", self.gateway.host, self.gateway.port);
        raw.parse()
            .with_context(|| format!("invalid gateway address: {raw}"))
    }

    /// Root directory of the filesystem workspace store.
    pub fn workspace_root(&self) -> PathBuf {
        match &self.workspace.root {
            Some(root) => PathBuf::from(root),
            None => crate::agent_home().join("workspaces"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
        assert_eq!(cfg.exa.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.workspace.backend, StoreBackend::Fs);
        assert!(cfg.exa.api_key.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::parse("exa:\n  apikey: x\n").is_err());
        assert!(Config::parse("models: []\n").is_err());
    }

    #[test]
    fn env_overrides_file() {
        let mut cfg = Config::parse("gateway:\n  port: 9000\nexa:\n  api_key: file-key\n").unwrap();
        cfg.apply_env_overrides(env(&[("PORT", "8123"), ("EXA_API_KEY", "env-key")]))
            .unwrap();
        assert_eq!(cfg.gateway.port, 8123);
        assert_eq!(cfg.exa.api_key.as_deref(), Some("env-key"));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(env(&[("EXA_API_KEY", ""), ("PORT", "")]))
            .unwrap();
        assert!(cfg.exa.api_key.is_none());
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_env_overrides(env(&[("PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("invalid PORT value"));
    }

    #[test]
    fn store_backend_from_env() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(env(&[("EXA_AGENT_STORE", "memory")]))
            .unwrap();
        assert_eq!(cfg.workspace.backend, StoreBackend::Memory);
    }

    #[test]
    fn env_refs_expand() {
        let lookup = |k: &str| (k == "MY_KEY").then(|| "secret".to_string());
        assert_eq!(expand_env_ref("$MY_KEY", lookup), "secret");
        assert_eq!(expand_env_ref("$MISSING", lookup), "");
        assert_eq!(expand_env_ref("plain", lookup), "plain");
        assert_eq!(expand_env_ref("$", lookup), "$");
    }

    #[test]
    fn host_backend_requires_key() {
        let cfg = Config::parse("workspace:\n  backend: host\n").unwrap();
        assert!(cfg.validate().is_err());
        let cfg =
            Config::parse("workspace:\n  backend: host\n  host_api_key: abc\n").unwrap();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_exa_settings() {
        let cfg = Config::parse("exa:\n  base_url: ftp://x\n").unwrap();
        assert!(cfg.validate().is_err());
        let cfg = Config::parse("exa:\n  timeout_secs: 0\n").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn gateway_addr_parses() {
        let mut cfg = Config::default();
        cfg.gateway.host = "127.0.0.1".into();
        assert_eq!(cfg.gateway_addr().unwrap().port(), DEFAULT_PORT);
    }
}
