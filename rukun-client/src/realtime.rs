//! WebSocket realtime manager with reconnect backoff.
//!
//! One [`WsManager`] owns at most one live socket. A supervisor task connects,
//! pumps frames in both directions and, when the socket closes without an
//! explicit [`WsManager::disconnect`], reconnects after `base * 2^attempt`.
//! Once `max_attempts` reconnects have failed the manager publishes
//! [`ConnectionState::Abandoned`] and stays down until `connect()` is called
//! again.
//!
//! Frames are JSON objects `{ "type": ..., "payload": ... }`. Each frame is
//! fanned out to every listener registered for its type. Malformed frames are
//! logged and dropped, and a failing or panicking listener never prevents the
//! others from running.

use crate::auth_store::AuthStore;
use crate::config::ReconnectConfig;
use async_trait::async_trait;
use futures_util::future;
use futures_util::sink::{Sink, SinkExt};
use futures_util::stream::{BoxStream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

// ============================================================================
// WIRE FORMAT AND ERRORS
// ============================================================================

/// One realtime frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WsMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum WsError {
    #[error("WebSocket error: {0}")]
    Socket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("Invalid WebSocket URL: {0}")]
    Url(String),
    #[error("WebSocket closed")]
    Closed,
}

/// Failure reported by a listener.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

// ============================================================================
// CONNECTOR SEAM
// ============================================================================

pub type OutboundSink = Pin<Box<dyn Sink<String, Error = WsError> + Send>>;
pub type InboundStream = BoxStream<'static, Result<String, WsError>>;

/// An open socket as text frames. The inbound stream ends when the peer
/// closes.
pub struct WsChannel {
    pub outbound: OutboundSink,
    pub inbound: InboundStream,
}

#[async_trait]
pub trait WsConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<WsChannel, WsError>;
}

/// `tokio-tungstenite` connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

#[async_trait]
impl WsConnector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<WsChannel, WsError> {
        let (stream, _) = tokio_tungstenite::connect_async(url).await?;
        let (sink, stream) = stream.split();

        let outbound = sink.with(|text: String| future::ready(Ok::<_, WsError>(Message::Text(text))));
        let inbound = stream
            .map_err(WsError::from)
            .try_take_while(|message| future::ready(Ok(!message.is_close())))
            .try_filter_map(|message| {
                future::ready(Ok(match message {
                    Message::Text(text) => Some(text),
                    _ => None,
                }))
            });

        Ok(WsChannel {
            outbound: Box::pin(outbound),
            inbound: Box::pin(inbound),
        })
    }
}

// ============================================================================
// LISTENERS
// ============================================================================

pub type Listener = Arc<dyn Fn(&Value) -> Result<(), ListenerError> + Send + Sync>;

/// Wrap a closure as a [`Listener`] handle usable with both `on` and `off`.
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&Value) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Event name to listener set. Identity is the `Arc` allocation.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `false` if this exact listener is already registered.
    pub fn add(&self, event: &str, listener: Listener) -> bool {
        let mut listeners = self.lock();
        let entry = listeners.entry(event.to_string()).or_default();
        if entry.iter().any(|existing| Arc::ptr_eq(existing, &listener)) {
            return false;
        }
        entry.push(listener);
        true
    }

    pub fn remove(&self, event: &str, listener: &Listener) -> bool {
        let mut listeners = self.lock();
        let Some(entry) = listeners.get_mut(event) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|existing| !Arc::ptr_eq(existing, listener));
        let removed = entry.len() != before;
        if entry.is_empty() {
            listeners.remove(event);
        }
        removed
    }

    pub fn count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }

    /// Invoke every listener for `event` once. Returns how many succeeded.
    ///
    /// The set is snapshotted first, so listeners may register or remove
    /// listeners without deadlocking.
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        let snapshot: Vec<Listener> = self.lock().get(event).cloned().unwrap_or_default();
        let mut succeeded = 0;
        for listener in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener(payload))) {
                Ok(Ok(())) => succeeded += 1,
                Ok(Err(err)) => warn!(event, error = %err, "WebSocket listener failed"),
                Err(panic) => warn!(event, panic = panic_message(&*panic), "WebSocket listener panicked"),
            }
        }
        succeeded
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self.lock();
        let mut counts: Vec<(&str, usize)> = listeners.iter().map(|(k, v)| (k.as_str(), v.len())).collect();
        counts.sort();
        f.debug_struct("ListenerRegistry").field("events", &counts).finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

// ============================================================================
// STATE AND POLICY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    /// Waiting `delay` before reconnect number `attempt` (1-based).
    Reconnecting { attempt: u32, delay: Duration },
    /// Reconnect attempts exhausted; only `connect()` restarts.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from(&ReconnectConfig::default())
    }
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_attempts: config.max_attempts,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the reconnect that follows `attempts` earlier ones.
    pub fn delay_for(&self, attempts: u32) -> Duration {
        let factor = 1u32.checked_shl(attempts).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

// ============================================================================
// MANAGER
// ============================================================================

/// Live-session bookkeeping. `generation` changes on every connect and
/// disconnect; a supervisor whose generation is stale may not touch state.
#[derive(Default)]
struct Control {
    generation: u64,
    stop: Option<watch::Sender<bool>>,
    outbound: Option<mpsc::UnboundedSender<String>>,
}

struct Inner {
    connector: Arc<dyn WsConnector>,
    ws_base_url: String,
    auth: AuthStore,
    policy: ReconnectPolicy,
    listeners: ListenerRegistry,
    state: watch::Sender<ConnectionState>,
    control: Mutex<Control>,
}

#[derive(Clone)]
pub struct WsManager {
    inner: Arc<Inner>,
}

impl WsManager {
    pub fn new(
        connector: Arc<dyn WsConnector>,
        ws_base_url: impl Into<String>,
        auth: AuthStore,
        policy: ReconnectPolicy,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            inner: Arc::new(Inner {
                connector,
                ws_base_url: ws_base_url.into(),
                auth,
                policy,
                listeners: ListenerRegistry::new(),
                state,
                control: Mutex::new(Control::default()),
            }),
        }
    }

    /// Open the socket with the current token, replacing any live session.
    ///
    /// Does nothing and returns `false` without a token. Must be called from
    /// within a Tokio runtime.
    pub fn connect(&self) -> bool {
        let Some(token) = self.inner.auth.token() else {
            debug!("No token; WebSocket connect skipped");
            return false;
        };
        if let Err(err) = socket_url(&self.inner.ws_base_url, &token) {
            warn!(error = %err, "WebSocket connect skipped");
            return false;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let generation = {
            let mut control = self.inner.control();
            if let Some(previous) = control.stop.take() {
                let _ = previous.send(true);
            }
            control.outbound = None;
            control.generation += 1;
            control.stop = Some(stop_tx);
            self.inner.state.send_replace(ConnectionState::Connecting);
            control.generation
        };

        tokio::spawn(supervise(self.inner.clone(), generation, stop_rx));
        true
    }

    /// Close the socket and stop reconnecting.
    pub fn disconnect(&self) {
        let mut control = self.inner.control();
        if let Some(stop) = control.stop.take() {
            let _ = stop.send(true);
            info!("WebSocket disconnected");
        }
        control.outbound = None;
        control.generation += 1;
        self.inner.state.send_replace(ConnectionState::Disconnected);
    }

    /// Send `{type, payload}` if connected. Otherwise the message is dropped
    /// and `false` is returned.
    pub fn send(&self, event: &str, payload: Value) -> bool {
        let message = WsMessage {
            kind: event.to_string(),
            payload,
        };
        let text = match serde_json::to_string(&message) {
            Ok(text) => text,
            Err(err) => {
                warn!(event, error = %err, "WebSocket message not serializable");
                return false;
            }
        };

        let control = self.inner.control();
        if let Some(outbound) = &control.outbound {
            if outbound.send(text).is_ok() {
                return true;
            }
        }
        debug!(event, "WebSocket not connected; message dropped");
        false
    }

    /// Register `listener` for `event`. Returns `false` if it already was.
    pub fn on(&self, event: &str, listener: Listener) -> bool {
        self.inner.listeners.add(event, listener)
    }

    pub fn off(&self, event: &str, listener: &Listener) -> bool {
        self.inner.listeners.remove(event, listener)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.inner.listeners
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.inner.policy
    }
}

impl std::fmt::Debug for WsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsManager")
            .field("ws_base_url", &self.inner.ws_base_url)
            .field("state", &self.state())
            .field("policy", &self.inner.policy)
            .finish()
    }
}

impl Inner {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, generation: u64, state: ConnectionState) -> bool {
        let control = self.control();
        if control.generation != generation {
            return false;
        }
        self.state.send_replace(state);
        true
    }

    fn attach(&self, generation: u64, outbound: mpsc::UnboundedSender<String>) -> bool {
        let mut control = self.control();
        if control.generation != generation {
            return false;
        }
        control.outbound = Some(outbound);
        self.state.send_replace(ConnectionState::Connected);
        true
    }

    fn detach(&self, generation: u64) {
        let mut control = self.control();
        if control.generation == generation {
            control.outbound = None;
        }
    }

    fn dispatch(&self, text: &str) {
        match serde_json::from_str::<WsMessage>(text) {
            Ok(message) => {
                let delivered = self.listeners.emit(&message.kind, &message.payload);
                debug!(event = %message.kind, delivered, "WebSocket message dispatched");
            }
            Err(err) => warn!(error = %err, "Dropping malformed WebSocket message"),
        }
    }
}

enum PumpOutcome {
    Closed,
    Stopped,
}

/// Every attempt reads the token afresh, so a refreshed session reconnects
/// with the new token and a cleared one stops the loop.
async fn supervise(inner: Arc<Inner>, generation: u64, mut stop: watch::Receiver<bool>) {
    let mut attempts: u32 = 0;
    loop {
        let url = match inner.auth.token().map(|token| socket_url(&inner.ws_base_url, &token)) {
            Some(Ok(url)) => url,
            Some(Err(err)) => {
                warn!(error = %err, "WebSocket reconnect stopped");
                inner.publish(generation, ConnectionState::Disconnected);
                return;
            }
            None => {
                info!("Session cleared; WebSocket reconnect stopped");
                inner.publish(generation, ConnectionState::Disconnected);
                return;
            }
        };
        if !inner.publish(generation, ConnectionState::Connecting) {
            return;
        }
        let connected = tokio::select! {
            result = inner.connector.connect(&url) => result,
            _ = stop.changed() => return,
        };

        match connected {
            Ok(channel) => {
                attempts = 0;
                info!("WebSocket connected");
                match pump(&inner, generation, channel, &mut stop).await {
                    PumpOutcome::Stopped => return,
                    PumpOutcome::Closed => info!("WebSocket closed"),
                }
            }
            Err(err) => warn!(error = %err, attempt = attempts, "WebSocket connection failed"),
        }

        if attempts >= inner.policy.max_attempts {
            warn!(attempts, "WebSocket reconnection abandoned");
            inner.publish(generation, ConnectionState::Abandoned);
            return;
        }
        let delay = inner.policy.delay_for(attempts);
        attempts += 1;
        if !inner.publish(
            generation,
            ConnectionState::Reconnecting {
                attempt: attempts,
                delay,
            },
        ) {
            return;
        }
        debug!(attempt = attempts, delay_ms = delay.as_millis() as u64, "WebSocket reconnect scheduled");

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = stop.changed() => return,
        }
    }
}

async fn pump(
    inner: &Inner,
    generation: u64,
    channel: WsChannel,
    stop: &mut watch::Receiver<bool>,
) -> PumpOutcome {
    let WsChannel {
        mut outbound,
        mut inbound,
    } = channel;
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    if !inner.attach(generation, tx) {
        let _ = outbound.close().await;
        return PumpOutcome::Stopped;
    }

    let outcome = loop {
        tokio::select! {
            frame = inbound.next() => match frame {
                Some(Ok(text)) => inner.dispatch(&text),
                Some(Err(err)) => {
                    error!(error = %err, "WebSocket error");
                    break PumpOutcome::Closed;
                }
                None => break PumpOutcome::Closed,
            },
            Some(text) = rx.recv() => {
                if let Err(err) = outbound.send(text).await {
                    error!(error = %err, "WebSocket send failed");
                    break PumpOutcome::Closed;
                }
            }
            _ = stop.changed() => {
                let _ = outbound.close().await;
                break PumpOutcome::Stopped;
            }
        }
    };

    inner.detach(generation);
    outcome
}

/// `ws_base_url?token=<token>`.
pub fn socket_url(ws_base_url: &str, token: &str) -> Result<String, WsError> {
    let mut url = reqwest::Url::parse(ws_base_url).map_err(|err| WsError::Url(err.to_string()))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url.into())
}
