//! Rukun Tetangga data-access layer.
//!
//! - [`auth_store`]: the signed-in session, persisted and observable
//! - [`http`]: the HTTP client with bearer injection and a TTL cache
//! - [`realtime`]: the WebSocket manager with reconnect backoff
//! - [`api`]: one function per domain action
//! - [`client`]: wiring of all of the above from a [`config::ClientConfig`]

pub mod api;
pub mod auth_store;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod persistence;
pub mod realtime;
pub mod telemetry;
pub mod transport;
pub mod utils;

pub use api::RukunApi;
pub use auth_store::{AuthStore, Session};
pub use cache::{CacheStats, ResponseCache};
pub use client::RukunClient;
pub use config::{ClientConfig, ConfigError, ReconnectConfig};
pub use error::{ClientError, ClientResult};
pub use http::{CachePolicy, HttpClient};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, PersistenceError};
pub use realtime::{
    listener, ConnectionState, Listener, ListenerError, ReconnectPolicy, TungsteniteConnector,
    WsChannel, WsConnector, WsError, WsManager,
};
pub use transport::{HttpRequest, HttpResponse, MultipartForm, ReqwestTransport, Transport, TransportError};
