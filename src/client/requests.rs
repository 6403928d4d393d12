//! Request methods.
//!
//! Thin wrappers that build a [`Command`] and send it through the
//! correlation engine. Each resolves with the server's [`Reply`].
//!
//! # Errors
//!
//! Every method fails with:
//!
//! - [`Error::NotConnected`](crate::Error::NotConnected) if no socket is attached
//! - [`Error::ConnectionClosed`](crate::Error::ConnectionClosed) if the socket closes first
//! - [`Error::Server`](crate::Error::Server) if the server answers `status: "error"`

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;

use crate::error::Result;
use crate::protocol::{Command, Reply};

use super::core::ObsRemote;

// ============================================================================
// ObsRemote - Raw Requests
// ============================================================================

impl ObsRemote {
    /// Sends any JSON object as a request.
    ///
    /// The body must carry its own `request-type`; `message-id` is added.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use obs_remote::ObsRemote;
    /// # use serde_json::json;
    /// # async fn example(obs: &ObsRemote) -> obs_remote::Result<()> {
    /// let reply = obs
    ///     .send(json!({ "request-type": "GetStudioModeStatus" }))
    ///     .await?;
    /// println!("studio mode: {}", reply.get_bool("studio-mode"));
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Also fails with [`Error::Protocol`](crate::Error::Protocol) if `body`
    /// is not a JSON object.
    pub async fn send(&self, body: impl Serialize) -> Result<Reply> {
        self.engine().send_request(body).await
    }

    #[inline]
    async fn command(&self, command: Command) -> Result<Reply> {
        self.engine().send_request(command).await
    }
}

// ============================================================================
// ObsRemote - General
// ============================================================================

impl ObsRemote {
    /// `GetVersion`.
    pub async fn get_version(&self) -> Result<Reply> {
        self.command(Command::GetVersion).await
    }

    /// `GetAuthRequired`. The reply carries `salt` and `challenge` when
    /// `authRequired` is set.
    pub async fn get_auth_required(&self) -> Result<Reply> {
        self.command(Command::GetAuthRequired).await
    }

    /// `Authenticate` with a precomputed challenge response.
    ///
    /// [`login`](Self::login) computes the response and tracks state; use
    /// this only to drive authentication by hand.
    pub async fn authenticate(&self, auth: impl Into<String>) -> Result<Reply> {
        self.command(Command::Authenticate { auth: auth.into() })
            .await
    }
}

// ============================================================================
// ObsRemote - Scenes
// ============================================================================

impl ObsRemote {
    /// `GetSceneList`.
    pub async fn get_scene_list(&self) -> Result<Reply> {
        self.command(Command::GetSceneList).await
    }

    /// `GetCurrentScene`.
    pub async fn get_current_scene(&self) -> Result<Reply> {
        self.command(Command::GetCurrentScene).await
    }

    /// Switches the program output to `scene_name`.
    pub async fn set_current_scene(&self, scene_name: impl Into<String>) -> Result<Reply> {
        self.command(Command::SetCurrentScene {
            scene_name: scene_name.into(),
        })
        .await
    }
}

// ============================================================================
// ObsRemote - Sources
// ============================================================================

impl ObsRemote {
    /// Shows or hides `source` in `scene_name`, or in the current scene
    /// when `scene_name` is `None`.
    pub async fn set_source_render(
        &self,
        source: impl Into<String>,
        render: bool,
        scene_name: Option<&str>,
    ) -> Result<Reply> {
        self.command(Command::SetSourceRender {
            scene_name: scene_name.map(str::to_string),
            source: source.into(),
            render,
        })
        .await
    }

    /// Alias for [`set_source_render`](Self::set_source_render).
    #[inline]
    pub async fn set_source_visibility(
        &self,
        source: impl Into<String>,
        visible: bool,
        scene_name: Option<&str>,
    ) -> Result<Reply> {
        self.set_source_render(source, visible, scene_name).await
    }

    /// `GetVolume`.
    pub async fn get_volume(&self, source: impl Into<String>) -> Result<Reply> {
        self.command(Command::GetVolume {
            source: source.into(),
        })
        .await
    }

    /// Sets the linear volume of `source`.
    pub async fn set_volume(&self, source: impl Into<String>, volume: f64) -> Result<Reply> {
        self.command(Command::SetVolume {
            source: source.into(),
            volume,
        })
        .await
    }

    /// Mutes or unmutes `source`.
    pub async fn set_mute(&self, source: impl Into<String>, mute: bool) -> Result<Reply> {
        self.command(Command::SetMute {
            source: source.into(),
            mute,
        })
        .await
    }

    /// `ToggleMute`.
    pub async fn toggle_mute(&self, source: impl Into<String>) -> Result<Reply> {
        self.command(Command::ToggleMute {
            source: source.into(),
        })
        .await
    }
}

// ============================================================================
// ObsRemote - Output
// ============================================================================

impl ObsRemote {
    /// `GetStreamingStatus`.
    pub async fn get_streaming_status(&self) -> Result<Reply> {
        self.command(Command::GetStreamingStatus).await
    }

    /// Starts streaming if stopped, stops it otherwise.
    pub async fn start_stop_streaming(&self) -> Result<Reply> {
        self.command(Command::StartStopStreaming).await
    }

    /// Starts recording if stopped, stops it otherwise.
    pub async fn start_stop_recording(&self) -> Result<Reply> {
        self.command(Command::StartStopRecording).await
    }
}

// ============================================================================
// Tests
// ============================================================================
