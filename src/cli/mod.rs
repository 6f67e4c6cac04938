//! CLI subcommand implementations.
//!
//! `main` parses arguments and hands off to these functions; each one
//! loads the configuration itself so they can be exercised from tests
//! with a temporary config file.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, info};

use crate::capabilities::{list_capabilities, ExaAgent, SYSTEM_PROMPT};
use crate::config::{Config, StoreBackend};
use crate::exa::ExaClient;
use crate::workspace::{FsStore, HostStore, MemoryStore, WorkspaceId, WorkspaceStore};

/// Build the workspace store selected by `workspace.backend`.
pub fn build_store(cfg: &Config) -> anyhow::Result<Arc<dyn WorkspaceStore>> {
    let store: Arc<dyn WorkspaceStore> = match cfg.workspace.backend {
        StoreBackend::Fs => {
            let root = cfg.workspace_root();
            debug!(root = %root.display(), "using filesystem workspace store");
            Arc::new(FsStore::new(root))
        }
        StoreBackend::Memory => {
            debug!("using in-memory workspace store");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Host => {
            debug!(url = %cfg.workspace.host_url, "using host workspace store");
            Arc::new(HostStore::new(
                &cfg.workspace.host_url,
                cfg.host_api_key(),
                cfg.exa_timeout(),
            )?)
        }
    };
    Ok(store)
}

/// Wire the configured store and Exa client into an [`ExaAgent`].
pub fn build_agent(cfg: &Config) -> anyhow::Result<ExaAgent> {
    let store = build_store(cfg)?;
    let client = ExaClient::new(&cfg.exa.base_url, cfg.exa_timeout())
        .context("failed to build Exa client")?;
    Ok(ExaAgent::new(store, Arc::new(client), cfg.default_api_key()))
}

/// Start the gateway and block until Ctrl-C.
pub async fn serve(config_path: &Path) -> anyhow::Result<()> {
    info!(path = %config_path.display(), "loading configuration");
    let cfg = Config::load(config_path).await?;
    let agent = Arc::new(build_agent(&cfg)?);

    if agent.credentials().default_key().is_empty() {
        info!("no default Exa API key; workspaces must set their own");
    }

    let addr = cfg.gateway_addr()?;
    let gateway =
        crate::gateway::start_gateway(addr, agent, cfg.gateway.api_token.clone())
            .await
            .with_context(|| format!("failed to bind gateway on {addr}"))?;

    println!();
    println!("  exa_agent v{}", env!("CARGO_PKG_VERSION"));
    println!("  Gateway:  http://{}", gateway.addr);
    println!("  Store:    {:?}", cfg.workspace.backend);
    println!();

    tokio::signal::ctrl_c().await?;
    info!("received Ctrl-C, shutting down");
    gateway.handle.abort();
    info!("shutdown complete");
    Ok(())
}

/// Print the capability catalogue.  `json` dumps schemas as well.
pub fn print_capabilities(json: bool) -> anyhow::Result<()> {
    let metas = list_capabilities();
    if json {
        let out = serde_json::json!({
            "system_prompt": SYSTEM_PROMPT,
            "capabilities": metas,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("{:<16} DESCRIPTION", "NAME");
    println!("{}", "─".repeat(76));
    for meta in &metas {
        println!("{:<16} {}", meta.name, meta.description);
    }
    println!("\n{} capabilities.", metas.len());
    Ok(())
}

/// Run one capability and return its text output.
pub async fn call_capability(
    config_path: &Path,
    name: &str,
    workspace: Option<WorkspaceId>,
    args: Option<&str>,
) -> anyhow::Result<String> {
    let cfg = Config::load(config_path).await?;
    let agent = build_agent(&cfg)?;
    let args: Value = match args {
        Some(raw) => serde_json::from_str(raw).context("--args must be a JSON object")?,
        None => Value::Null,
    };
    agent.call(name, workspace, args).await
}

/// Store an Exa API key for one workspace.
pub async fn set_key(config_path: &Path, workspace: WorkspaceId, key: &str) -> anyhow::Result<()> {
    let cfg = Config::load(config_path).await?;
    let store = build_store(&cfg)?;
    let resolver = crate::credentials::CredentialResolver::new(store, cfg.default_api_key());
    resolver.store(workspace, key).await?;
    println!("API key saved for workspace {workspace}.");
    Ok(())
}

/// Probe a running gateway's `/api/health` endpoint.
pub async fn check_status(config_path: &Path) -> anyhow::Result<()> {
    let cfg = Config::load(config_path).await?;
    let host = match cfg.gateway.host.as_str() {
        "0.0.0.0" => "127.0.0.1",
        other => other,
    };
    let addr = format!("{host}:{}", cfg.gateway.port);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(3))
        .build()?;

    match client.get(format!("http://{addr}/api/health")).send().await {
        Ok(resp) if resp.status().is_success() => {
            let body: Value = resp.json().await.unwrap_or_default();
            println!("exa_agent is running");
            println!("   Gateway: http://{addr}");
            if let Some(version) = body.get("version").and_then(|v| v.as_str()) {
                println!("   Version: {version}");
            }
            if let Some(uptime) = body.get("uptime_secs").and_then(|v| v.as_u64()) {
                println!("   Uptime:  {uptime}s");
            }
            Ok(())
        }
        Ok(resp) => {
            println!("exa_agent responded with status: {}", resp.status());
            Ok(())
        }
        Err(_) => {
            println!("exa_agent is not running (no response at http://{addr})");
            println!("   Start it with: exa-agent start");
            Ok(())
        }
    }
}
