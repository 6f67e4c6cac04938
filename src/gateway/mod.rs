//! HTTP gateway the agent host calls into.
//!
//! Serves:
//! - `GET /api/status` and `GET /api/health`
//! - `GET /tools`: system prompt plus the capability catalogue
//! - `POST /tools/:name`: run one capability, body
//!   `{"args": {...}, "action": {"workspace": {"id": N}}}`
//!
//! The `/tools` routes sit behind bearer-token auth when a token is set.

mod auth;
mod handlers;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::capabilities::ExaAgent;

/// Handle returned by [`start_gateway`].
pub struct Gateway {
    /// Server task handle.
    pub handle: JoinHandle<()>,
    /// The address the server is actually listening on.
    pub addr: SocketAddr,
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) agent: Arc<ExaAgent>,
    pub(crate) api_token: Option<String>,
}

/// Build the router without binding a socket.
pub fn router(agent: Arc<ExaAgent>, api_token: Option<String>) -> Router {
    let state = AppState {
        agent,
        api_token: api_token.filter(|t| !t.is_empty()),
    };

    if state.api_token.is_some() {
        info!("API authentication enabled");
    } else {
        warn!("API authentication disabled (no api_token configured)");
    }

    let tools_router = Router::new()
        .route("/tools", get(handlers::tools::api_tools_list))
        .route("/tools/:name", post(handlers::tools::api_tool_call))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let api_router = Router::new()
        .route("/status", get(handlers::health::status_handler))
        .route("/health", get(handlers::health::api_health));

    Router::new()
        .nest("/api", api_router)
        .merge(tools_router)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway on `addr` (port `0` picks a free port).
pub async fn start_gateway(
    addr: SocketAddr,
    agent: Arc<ExaAgent>,
    api_token: Option<String>,
) -> std::io::Result<Gateway> {
    let _ = handlers::health::STARTUP_TIME.set(std::time::Instant::now());

    let app = router(agent, api_token);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("gateway server error: {e}");
        }
    });

    info!(%bound_addr, "gateway started");

    Ok(Gateway {
        handle,
        addr: bound_addr,
    })
}
