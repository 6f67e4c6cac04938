//! exa_agent: Exa neural search exposed as agent capabilities.
//!
//! This library crate re-exports modules so integration tests
//! (under `tests/`) can access them.

pub mod capabilities;
pub mod cli;
pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod exa;
pub mod format;
pub mod gateway;
pub mod workspace;

/// Return the exa_agent home directory.
///
/// Resolution order:
/// 1. `EXA_AGENT_HOME` environment variable
/// 2. `$HOME/.exa_agent`
pub fn agent_home() -> std::path::PathBuf {
    if let Ok(p) = std::env::var("EXA_AGENT_HOME") {
        std::path::PathBuf::from(p)
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join(".exa_agent")
    }
}
