//! Process-level wiring of the data-access layer.
//!
//! [`RukunClient::bootstrap`] is the process entry point: it loads the
//! [`ClientConfig`], installs logging with the configured `log_filter` and
//! then calls [`RukunClient::from_config`], which builds durable storage, the
//! restored session, the HTTP client over `reqwest` and the realtime manager
//! over `tokio-tungstenite`. Tests and embedders that need other transports
//! use [`RukunClient::with_parts`].

use crate::api::RukunApi;
use crate::auth_store::AuthStore;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::persistence::{FileStore, KeyValueStore};
use crate::realtime::{ReconnectPolicy, TungsteniteConnector, WsConnector, WsManager};
use crate::telemetry;
use crate::transport::{ReqwestTransport, Transport};
use std::ops::Deref;
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Debug)]
pub struct RukunClient {
    api: RukunApi,
}

impl RukunClient {
    /// Load configuration with [`ClientConfig::load`] and [`start`](Self::start).
    pub fn bootstrap() -> ClientResult<Self> {
        let config = ClientConfig::load()?;
        Self::start(&config)
    }

    /// Install the global tracing subscriber with `config.log_filter`, then
    /// build the production client.
    pub fn start(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        telemetry::init_tracing(&config.log_filter);
        Self::from_config(config)
    }

    /// Build the production client. Must be called from within a Tokio
    /// runtime when a session is restored, since the socket connects
    /// immediately.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config.storage_path));
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(config.request_timeout())?);
        let connector: Arc<dyn WsConnector> = Arc::new(TungsteniteConnector);
        Ok(Self::with_parts(config, storage, transport, connector))
    }

    /// Build from explicit parts.
    ///
    /// The session is restored from `storage`; when one is found the realtime
    /// socket is connected straight away.
    pub fn with_parts(
        config: &ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        transport: Arc<dyn Transport>,
        connector: Arc<dyn WsConnector>,
    ) -> Self {
        let auth = AuthStore::restore(storage);
        let http = HttpClient::new(transport, &config.api_base_url, auth.clone())
            .with_default_ttl(config.default_cache_ttl());
        let ws = WsManager::new(
            connector,
            config.ws_base_url.clone(),
            auth.clone(),
            ReconnectPolicy::from(&config.reconnect),
        );

        if auth.is_authenticated() {
            info!("Session restored");
            ws.connect();
        }

        Self {
            api: RukunApi::new(http, ws),
        }
    }

    pub fn api(&self) -> &RukunApi {
        &self.api
    }

    pub fn auth_store(&self) -> &AuthStore {
        self.api.http().auth()
    }
}

impl Deref for RukunClient {
    type Target = RukunApi;

    fn deref(&self) -> &RukunApi {
        &self.api
    }
}
