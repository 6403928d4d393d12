//! Typed request bodies.
//!
//! Each variant serializes to the object obs-websocket expects, tagged by
//! `request-type`. The correlator adds `message-id` when the request is sent.
//!
//! # Request Types
//!
//! | Area | Requests |
//! |------|----------|
//! | General | `GetVersion`, `GetAuthRequired`, `Authenticate` |
//! | Scenes | `GetSceneList`, `GetCurrentScene`, `SetCurrentScene` |
//! | Sources | `SetSourceRender`, `GetVolume`, `SetVolume`, `SetMute`, `ToggleMute` |
//! | Output | `GetStreamingStatus`, `StartStopStreaming`, `StartStopRecording` |

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// Command
// ============================================================================

/// A request understood by obs-websocket 4.x.
///
/// Anything not covered here can still be sent as a raw JSON object through
/// [`ObsRemote::send`](crate::ObsRemote::send).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "request-type")]
pub enum Command {
    /// Plugin and protocol versions.
    GetVersion,

    /// Whether authentication is required, with salt and challenge if so.
    GetAuthRequired,

    /// Challenge-response authentication.
    Authenticate {
        /// Base64 challenge response.
        auth: String,
    },

    /// All scenes and the current scene.
    GetSceneList,

    /// The current scene and its sources.
    GetCurrentScene,

    /// Switch to a scene.
    SetCurrentScene {
        /// Scene to switch to.
        #[serde(rename = "scene-name")]
        scene_name: String,
    },

    /// Show or hide a source.
    SetSourceRender {
        /// Scene holding the source. Current scene when absent.
        #[serde(rename = "scene-name", skip_serializing_if = "Option::is_none")]
        scene_name: Option<String>,
        /// Source name.
        source: String,
        /// `true` to show.
        render: bool,
    },

    /// Streaming and recording state.
    GetStreamingStatus,

    /// Toggle streaming.
    StartStopStreaming,

    /// Toggle recording.
    StartStopRecording,

    /// Volume and mute state of a source.
    GetVolume {
        /// Source name.
        source: String,
    },

    /// Set a source's volume.
    SetVolume {
        /// Source name.
        source: String,
        /// Linear volume, `0.0..=1.0`.
        volume: f64,
    },

    /// Mute or unmute a source.
    SetMute {
        /// Source name.
        source: String,
        /// `true` to mute.
        mute: bool,
    },

    /// Flip the mute state of a source.
    ToggleMute {
        /// Source name.
        source: String,
    },
}

impl Command {
    /// Returns the `request-type` tag.
    #[must_use]
    pub const fn request_type(&self) -> &'static str {
        match self {
            Self::GetVersion => "GetVersion",
            Self::GetAuthRequired => "GetAuthRequired",
            Self::Authenticate { .. } => "Authenticate",
            Self::GetSceneList => "GetSceneList",
            Self::GetCurrentScene => "GetCurrentScene",
            Self::SetCurrentScene { .. } => "SetCurrentScene",
            Self::SetSourceRender { .. } => "SetSourceRender",
            Self::GetStreamingStatus => "GetStreamingStatus",
            Self::StartStopStreaming => "StartStopStreaming",
            Self::StartStopRecording => "StartStopRecording",
            Self::GetVolume { .. } => "GetVolume",
            Self::SetVolume { .. } => "SetVolume",
            Self::SetMute { .. } => "SetMute",
            Self::ToggleMute { .. } => "ToggleMute",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
