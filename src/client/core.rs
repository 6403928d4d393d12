//! Session facade.
//!
//! [`ObsRemote`] sequences the connect handshake and authentication, and
//! exposes the event bus. Requests go through the shared
//! [`Correlator`].
//!
//! # Session States
//!
//! ```text
//! Disconnected ─connect─► Connecting ─open─► AwaitingHandshake
//!                                               │
//!                      auth required ◄──────────┴──────────► no auth
//!                            │                                  │
//!              ConnectedUnauthenticated ─login─► Authenticating ─► Ready
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::events::{EventBus, EventEmitter, EventName, Listener};
use crate::identifiers::SubscriptionId;
use crate::protocol::Reply;
use crate::transport::{Correlator, Socket};

use super::auth::challenge_response;
use super::builder::ClientBuilder;
use super::config::ClientConfig;

// ============================================================================
// SessionState
// ============================================================================

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No socket.
    Disconnected,
    /// Socket opening.
    Connecting,
    /// Socket open, version and auth queries in flight.
    AwaitingHandshake,
    /// Server requires authentication.
    ConnectedUnauthenticated,
    /// `Authenticate` in flight.
    Authenticating,
    /// Usable.
    Ready,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingHandshake => "awaiting-handshake",
            Self::ConnectedUnauthenticated => "connected-unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Ready => "ready",
        };
        f.write_str(name)
    }
}

// ============================================================================
// ConnectInfo
// ============================================================================

/// Result of the connect handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectInfo {
    /// obs-websocket plugin version.
    pub version: String,
    /// Whether [`ObsRemote::login`] is needed before other requests.
    pub auth_required: bool,
}

impl ConnectInfo {
    /// Builds the info from the `GetVersion` and `GetAuthRequired` replies.
    ///
    /// Older servers report the version under `version` instead of
    /// `obs-websocket-version`.
    fn from_replies(version: &Reply, auth: &Reply) -> Self {
        let version = version
            .get_str("obs-websocket-version")
            .map(str::to_string)
            .or_else(|| version.get("version").map(render_version))
            .unwrap_or_default();

        Self {
            version,
            auth_required: auth.get_bool("authRequired"),
        }
    }
}

fn render_version(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// ObsRemote
// ============================================================================

/// Client for one obs-websocket server.
///
/// Cloning is cheap; clones share the socket, pending requests, listeners
/// and session state.
///
/// # Example
///
/// ```no_run
/// use obs_remote::{EventName, ObsRemote};
///
/// # async fn example() -> obs_remote::Result<()> {
/// let obs = ObsRemote::new("localhost", 4444);
/// obs.on(EventName::ScenesSwitch, |payload| {
///     println!("switched to {}", payload["scene-name"]);
/// });
///
/// let info = obs.connect().await?;
/// if info.auth_required {
///     obs.login(Some("hunter2")).await?;
/// }
/// obs.set_current_scene("Intermission").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ObsRemote {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    bus: Arc<EventBus>,
    engine: Arc<Correlator>,
    state: Mutex<SessionState>,
}

impl Default for ObsRemote {
    fn default() -> Self {
        Self::with_config(ClientConfig::default())
    }
}

impl ObsRemote {
    /// Creates a client for `host:port` without validating the address.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::with_config(ClientConfig::new(host, port))
    }

    /// Creates a builder.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client from a config.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let bus = Arc::new(EventBus::new());
        let emitter: Arc<dyn EventEmitter> = bus.clone();
        let engine = Arc::new(Correlator::new(emitter));
        engine.set_debug(config.debug);

        Self {
            inner: Arc::new(ClientInner {
                config,
                bus,
                engine,
                state: Mutex::new(SessionState::Disconnected),
            }),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// The settings this client was created with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Enables or disables echoing of inbound frames.
    #[inline]
    pub fn set_debug(&self, enabled: bool) {
        self.inner.engine.set_debug(enabled);
    }

    /// Returns `true` if inbound frames are echoed.
    #[inline]
    #[must_use]
    pub fn debug(&self) -> bool {
        self.inner.engine.debug()
    }

    /// Current session state.
    ///
    /// Reports [`SessionState::Disconnected`] once the socket has closed.
    #[must_use]
    pub fn state(&self) -> SessionState {
        let state = *self.inner.state.lock();
        match state {
            SessionState::Disconnected | SessionState::Connecting => state,
            _ if !self.inner.engine.is_attached() => SessionState::Disconnected,
            _ => state,
        }
    }

    /// Number of requests awaiting a reply.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.engine.pending_count()
    }

    #[inline]
    fn set_state(&self, state: SessionState) {
        *self.inner.state.lock() = state;
    }

    #[inline]
    pub(crate) fn engine(&self) -> &Correlator {
        &self.inner.engine
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Opens the socket and runs the capability handshake.
    ///
    /// Any previous socket is detached and closed first. Publishes
    /// `socket.open` once the socket is up and `ready` before returning when
    /// the server needs no authentication.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectRejected`] if the socket could not be opened
    /// - [`Error::ConnectionClosed`] if it closed during the handshake
    /// - [`Error::Server`] if the server rejected a handshake query
    pub async fn connect(&self) -> Result<ConnectInfo> {
        let engine = &self.inner.engine;

        if engine.detach() {
            debug!("Superseded previous socket");
        }

        self.set_state(SessionState::Connecting);

        let url = self.inner.config.ws_url();
        debug!(%url, "Connecting");

        let (epoch, handler) = engine.signal_handler();
        let (socket, driver) = match Socket::open(&url, handler).await {
            Ok(opened) => opened,
            Err(event) => {
                self.set_state(SessionState::Disconnected);
                warn!(%url, code = event.code, "Connect failed");
                return Err(Error::connect_rejected(event));
            }
        };

        // Attach before the driver runs so a close is never missed
        engine.attach(epoch, socket);
        self.set_state(SessionState::AwaitingHandshake);
        driver.start();

        let (version, auth) =
            match tokio::try_join!(self.get_version(), self.get_auth_required()) {
                Ok(replies) => replies,
                Err(e) => {
                    self.set_state(if e.is_connection_error() {
                        SessionState::Disconnected
                    } else {
                        SessionState::ConnectedUnauthenticated
                    });
                    // Closed before the first query went out
                    return Err(match e {
                        Error::NotConnected => Error::ConnectionClosed,
                        other => other,
                    });
                }
            };

        let info = ConnectInfo::from_replies(&version, &auth);

        if info.auth_required {
            self.set_state(SessionState::ConnectedUnauthenticated);
        } else {
            self.set_state(SessionState::Ready);
            self.inner.bus.publish(EventName::Ready, &Value::Null);
        }

        info!(
            version = %info.version,
            auth_required = info.auth_required,
            "Connected to obs-websocket"
        );

        Ok(info)
    }

    /// Authenticates if the server asks for it.
    ///
    /// Returns `Ok(true)` straight away when no authentication is required.
    /// Otherwise answers the server's challenge and publishes `ready` on
    /// success. An empty password counts as missing.
    ///
    /// # Errors
    ///
    /// - [`Error::PasswordRequired`] if a password is needed and none given
    /// - [`Error::Server`] if the server rejects the password
    /// - [`Error::Protocol`] if the server sent no salt or challenge
    pub async fn login(&self, password: Option<&str>) -> Result<bool> {
        let auth = self.get_auth_required().await?;
        if !auth.get_bool("authRequired") {
            return Ok(true);
        }

        let Some(password) = password.filter(|p| !p.is_empty()) else {
            return Err(Error::PasswordRequired);
        };

        let salt = auth
            .get_str("salt")
            .ok_or_else(|| Error::protocol("GetAuthRequired reply has no salt"))?;
        let challenge = auth
            .get_str("challenge")
            .ok_or_else(|| Error::protocol("GetAuthRequired reply has no challenge"))?;

        let response = challenge_response(password, salt, challenge);

        self.set_state(SessionState::Authenticating);

        match self.authenticate(response).await {
            Ok(_) => {
                self.set_state(SessionState::Ready);
                info!("Authenticated");
                self.inner.bus.publish(EventName::Ready, &Value::Null);
                Ok(true)
            }
            Err(e) => {
                self.set_state(SessionState::ConnectedUnauthenticated);
                warn!(error = %e, "Authentication failed");
                Err(e)
            }
        }
    }

    /// Closes the socket.
    ///
    /// `socket.close` is still published. Requests still in flight fail
    /// with [`Error::ConnectionClosed`].
    pub fn close(&self) {
        if self.inner.engine.close() {
            debug!("Closed by caller");
        }
        self.set_state(SessionState::Disconnected);
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Registers a closure for one event.
    pub fn on<F>(&self, event: EventName, listener: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.subscribe(event, Arc::new(listener))
    }
}

impl EventEmitter for ObsRemote {
    fn subscribe(&self, event: EventName, listener: Listener) -> SubscriptionId {
        self.inner.bus.subscribe(event, listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.bus.unsubscribe(id)
    }

    fn publish(&self, event: EventName, payload: &Value) {
        self.inner.bus.publish(event, payload);
    }
}

impl fmt::Debug for ObsRemote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObsRemote")
            .field("config", &self.inner.config)
            .field("state", &self.state())
            .field("engine", &self.inner.engine)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
