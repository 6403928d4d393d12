//! Server-pushed update messages.
//!
//! Updates are notifications the server sends on its own, without a
//! `message-id`. They carry an `update-type` tag plus event-specific fields.
//!
//! # Update Types
//!
//! | Area | Updates |
//! |------|---------|
//! | Streaming | `StreamStatus`, `StreamStarting`, `StreamStopping` |
//! | Scenes | `SwitchScenes`, `ScenesChanged` |
//! | Sources | `SourceOrderChanged`, `SourceChanged`, `RepopulateSources`, `VolumeChanged` |

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value};

use super::UPDATE_TYPE_FIELD;

// ============================================================================
// Update
// ============================================================================

/// A server-pushed notification.
///
/// # Format
///
/// ```json
/// {
///   "update-type": "SwitchScenes",
///   "scene-name": "Scene B",
///   "sources": [ ... ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    update_type: String,
    payload: Map<String, Value>,
}

impl Update {
    /// Wraps a decoded object whose `update-type` was already extracted.
    #[inline]
    pub(crate) fn new(update_type: String, payload: Map<String, Value>) -> Self {
        Self {
            update_type,
            payload,
        }
    }

    /// Builds an update from a JSON value.
    ///
    /// Returns `None` unless the value is an object with a string
    /// `update-type`.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(payload) = value else {
            return None;
        };
        let update_type = payload.get(UPDATE_TYPE_FIELD)?.as_str()?.to_string();
        Some(Self::new(update_type, payload))
    }

    /// The raw `update-type` tag.
    #[inline]
    #[must_use]
    pub fn update_type(&self) -> &str {
        &self.update_type
    }

    /// The recognised update kind, or `None` for tags this client does not
    /// know about.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<UpdateKind> {
        UpdateKind::from_tag(&self.update_type)
    }

    /// The full update object, tag included.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Consumes the update into a JSON value.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.payload)
    }
}

// ============================================================================
// UpdateKind
// ============================================================================

/// The closed set of update tags the client routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    /// Periodic streaming statistics.
    StreamStatus,
    /// Streaming is starting.
    StreamStarting,
    /// Streaming is stopping.
    StreamStopping,
    /// The current scene changed.
    SwitchScenes,
    /// The scene list changed.
    ScenesChanged,
    /// Sources in a scene were reordered.
    SourceOrderChanged,
    /// A single source changed.
    SourceChanged,
    /// All sources should be fetched again.
    RepopulateSources,
    /// A source's volume changed.
    VolumeChanged,
}

impl UpdateKind {
    /// Every known kind.
    pub const ALL: [Self; 9] = [
        Self::StreamStatus,
        Self::StreamStarting,
        Self::StreamStopping,
        Self::SwitchScenes,
        Self::ScenesChanged,
        Self::SourceOrderChanged,
        Self::SourceChanged,
        Self::RepopulateSources,
        Self::VolumeChanged,
    ];

    /// Parses an `update-type` tag.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_tag() == tag)
    }

    /// Returns the wire tag.
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::StreamStatus => "StreamStatus",
            Self::StreamStarting => "StreamStarting",
            Self::StreamStopping => "StreamStopping",
            Self::SwitchScenes => "SwitchScenes",
            Self::ScenesChanged => "ScenesChanged",
            Self::SourceOrderChanged => "SourceOrderChanged",
            Self::SourceChanged => "SourceChanged",
            Self::RepopulateSources => "RepopulateSources",
            Self::VolumeChanged => "VolumeChanged",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
