//! Publish/subscribe capability.
//!
//! [`EventEmitter`] is the seam between the protocol layers and the
//! embedding application. [`EventBus`] is the in-memory implementation the
//! client carries; the correlator only ever sees the trait object.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::trace;

use crate::error::Error;
use crate::identifiers::SubscriptionId;

// ============================================================================
// Types
// ============================================================================

/// Event listener callback.
///
/// Called synchronously on the socket task; keep it short and hand heavy
/// work to another task.
pub type Listener = Arc<dyn Fn(&Value) + Send + Sync>;

/// Listeners registered for one event name.
type ListenerList = Vec<(SubscriptionId, Listener)>;

// ============================================================================
// EventName
// ============================================================================

/// Application-facing event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Session usable: connected and, if required, authenticated.
    Ready,
    /// The socket opened.
    SocketOpen,
    /// The socket reported an error.
    SocketError,
    /// The socket closed.
    SocketClose,
    /// Undecodable frame or error reply nobody was waiting for.
    Error,
    /// `StreamStatus` update.
    StreamStatus,
    /// `StreamStarting` update.
    StreamStart,
    /// `StreamStopping` update.
    StreamStop,
    /// `SwitchScenes` update.
    ScenesSwitch,
    /// `ScenesChanged` update.
    ScenesChange,
    /// `SourceOrderChanged` update.
    SourcesOrder,
    /// `SourceChanged` update.
    SourceChange,
    /// `RepopulateSources` update.
    SourceRepopulate,
    /// `VolumeChanged` update.
    VolumeChange,
}

impl EventName {
    /// Every event name.
    pub const ALL: [Self; 14] = [
        Self::Ready,
        Self::SocketOpen,
        Self::SocketError,
        Self::SocketClose,
        Self::Error,
        Self::StreamStatus,
        Self::StreamStart,
        Self::StreamStop,
        Self::ScenesSwitch,
        Self::ScenesChange,
        Self::SourcesOrder,
        Self::SourceChange,
        Self::SourceRepopulate,
        Self::VolumeChange,
    ];

    /// Returns the dotted event name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::SocketOpen => "socket.open",
            Self::SocketError => "socket.error",
            Self::SocketClose => "socket.close",
            Self::Error => "error",
            Self::StreamStatus => "stream.status",
            Self::StreamStart => "stream.start",
            Self::StreamStop => "stream.stop",
            Self::ScenesSwitch => "scenes.switch",
            Self::ScenesChange => "scenes.change",
            Self::SourcesOrder => "sources.order",
            Self::SourceChange => "source.change",
            Self::SourceRepopulate => "source.repopulate",
            Self::VolumeChange => "volume.change",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventName {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == name)
            .ok_or_else(|| Error::config(format!("Unknown event name: {name}")))
    }
}

// ============================================================================
// EventEmitter
// ============================================================================

/// Publish/subscribe capability.
pub trait EventEmitter: Send + Sync {
    /// Registers a listener for one event name.
    fn subscribe(&self, event: EventName, listener: Listener) -> SubscriptionId;

    /// Removes a listener. Returns `false` if it was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Delivers a payload to every listener of `event`.
    fn publish(&self, event: EventName, payload: &Value);
}

// ============================================================================
// EventBus
// ============================================================================

/// In-memory [`EventEmitter`].
///
/// Listeners are invoked in registration order. The listener table is not
/// locked while listeners run, so a listener may subscribe or unsubscribe.
#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<FxHashMap<EventName, ListenerList>>,
    next_id: AtomicU64,
}

impl EventBus {
    /// Creates an empty bus.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of listeners registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: EventName) -> usize {
        self.listeners.read().get(&event).map_or(0, Vec::len)
    }
}

impl EventEmitter for EventBus {
    fn subscribe(&self, event: EventName, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.listeners
            .write()
            .entry(event)
            .or_default()
            .push((id, listener));
        trace!(%event, %id, "Listener subscribed");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        for list in listeners.values_mut() {
            if let Some(index) = list.iter().position(|(sub, _)| *sub == id) {
                list.remove(index);
                return true;
            }
        }
        false
    }

    fn publish(&self, event: EventName, payload: &Value) {
        let targets: Vec<Listener> = match self.listeners.read().get(&event) {
            Some(list) => list.iter().map(|(_, l)| Arc::clone(l)).collect(),
            None => return,
        };

        trace!(%event, listeners = targets.len(), "Publishing event");

        for listener in targets {
            listener(payload);
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        f.debug_struct("EventBus")
            .field("events", &listeners.len())
            .field("listeners", &listeners.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
