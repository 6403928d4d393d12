//! Error types for the obs-websocket client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use obs_remote::{ObsRemote, Result};
//!
//! async fn example(obs: &ObsRemote) -> Result<()> {
//!     obs.connect().await?;
//!     obs.set_current_scene("Intermission").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Transport | [`Error::ConnectRejected`], [`Error::ConnectionClosed`] |
//! | Precondition | [`Error::NotConnected`], [`Error::PasswordRequired`] |
//! | Protocol | [`Error::Protocol`] |
//! | Application | [`Error::Server`] |
//! | External | [`Error::Json`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;

use crate::protocol::Reply;
use crate::transport::CloseEvent;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned by the client builder when host or port is unusable.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// The socket closed or failed before the connection opened.
    ///
    /// `error` is the mapped close reason, e.g. `"Server not reachable"`.
    #[error("Connect failed: {error} (code {})", event.code)]
    ConnectRejected {
        /// Human readable reason derived from the close code.
        error: String,
        /// The close event reported by the transport.
        event: CloseEvent,
    },

    /// The socket closed while the request was in flight.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Precondition Errors
    // ========================================================================
    /// A request was issued with no socket attached.
    #[error("Connection isn't opened")]
    NotConnected,

    /// The server requires authentication and no password was supplied.
    #[error("Password Required")]
    PasswordRequired,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected message shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    // ========================================================================
    // Application Errors
    // ========================================================================
    /// The server answered the request with `status: "error"`.
    ///
    /// Carries the complete reply so callers can inspect extra fields.
    #[error("Server error: {error}")]
    Server {
        /// The `error` field of the reply.
        error: String,
        /// The full reply payload.
        reply: Reply,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connect rejection from a close event.
    ///
    /// The reason is looked up from the close code.
    #[inline]
    pub fn connect_rejected(event: CloseEvent) -> Self {
        Self::ConnectRejected {
            error: event.describe().to_string(),
            event,
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a server error from an error reply.
    #[inline]
    pub fn server(reply: Reply) -> Self {
        Self::Server {
            error: reply.error().unwrap_or("Unknown Error").to_string(),
            reply,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a transport-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::ConnectRejected { .. } | Self::ConnectionClosed | Self::NotConnected
        )
    }

    /// Returns `true` if the server rejected the request.
    #[inline]
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// Returns the server's reply when the server rejected the request.
    #[inline]
    #[must_use]
    pub fn reply(&self) -> Option<&Reply> {
        match self {
            Self::Server { reply, .. } => Some(reply),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
