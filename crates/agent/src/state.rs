use std::sync::Arc;

use crate::config::ServerConfig;
use crate::service::AgentService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub agent: Arc<AgentService>,
}
