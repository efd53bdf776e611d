use std::sync::Arc;

use interio_core::assets::AssetStore;
use interio_events::EventBus;
use interio_providers::blockade::BlockadeClient;
use interio_providers::fetch::AssetFetcher;
use interio_providers::stable_diffusion::SdClient;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (Unity viewers).
    pub ws_manager: Arc<WsManager>,
    /// Fan-out bus for real-time notifications.
    pub event_bus: Arc<EventBus>,
    /// Current / previous skybox slots.
    pub assets: Arc<AssetStore>,
    pub fetcher: AssetFetcher,
    pub blockade: Arc<BlockadeClient>,
    pub sd: Arc<SdClient>,
    /// Shared HTTP client, also used to forward agent gateway calls.
    pub http: reqwest::Client,
    /// Callback URL handed to the skybox generator, resolved at startup.
    pub webhook_url: Option<String>,
}

impl AppState {
    /// Wire up every service from configuration.
    ///
    /// `webhook_url` must already be resolved (see
    /// [`SkyboxConfig::resolve_webhook_url`](crate::config::SkyboxConfig::resolve_webhook_url)).
    pub fn new(
        config: ServerConfig,
        http: reqwest::Client,
        fetcher: AssetFetcher,
        webhook_url: Option<String>,
    ) -> Self {
        let assets = AssetStore::new(
            config.assets.dir.clone(),
            config.assets.current_name.clone(),
            config.assets.previous_name.clone(),
        );
        let blockade = BlockadeClient::new(
            http.clone(),
            config.skybox.endpoint.clone(),
            config.skybox.api_key.clone(),
        );
        let sd = SdClient::new(http.clone(), config.sd.api_url.clone());

        Self {
            config: Arc::new(config),
            ws_manager: Arc::new(WsManager::new()),
            event_bus: Arc::new(EventBus::default()),
            assets: Arc::new(assets),
            fetcher,
            blockade: Arc::new(blockade),
            sd: Arc::new(sd),
            http,
            webhook_url,
        }
    }
}
