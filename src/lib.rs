//! obs-remote - Async client for the obs-websocket 4.x protocol.
//!
//! This library remote-controls OBS Studio over the obs-websocket plugin:
//! it sends requests, matches replies to their callers, and turns
//! server-pushed updates into named events.
//!
//! # Architecture
//!
//! The client talks to a single obs-websocket server:
//!
//! - **Requests**: JSON objects tagged with `request-type` and a
//!   client-assigned `message-id`
//! - **Replies**: echo the `message-id` with `status: "ok" | "error"`
//! - **Updates**: carry `update-type` and are published as events
//!
//! Key design principles:
//!
//! - Any number of requests in flight; replies may arrive in any order
//! - Identifiers never repeat for the life of a client, across reconnects
//! - Malformed or unsolicited traffic is reported as an `error` event, never
//!   as a failed request
//! - Event-driven (no polling)
//!
//! # Quick Start
//!
//! ```no_run
//! use obs_remote::{EventName, ObsRemote, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let obs = ObsRemote::builder().host("localhost").port(4444).build()?;
//!
//!     obs.on(EventName::ScenesSwitch, |payload| {
//!         println!("Now showing {}", payload["scene-name"]);
//!     });
//!
//!     let info = obs.connect().await?;
//!     println!("obs-websocket {}", info.version);
//!
//!     if info.auth_required {
//!         obs.login(Some("hunter2")).await?;
//!     }
//!
//!     let scenes = obs.get_scene_list().await?;
//!     println!("Current scene: {}", scenes.get_string("current-scene"));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`ObsRemote`] session facade and configuration |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`events`] | Event names, bus and update routing |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | obs-websocket message types |
//! | [`transport`] | WebSocket adapter and correlation engine |

// ============================================================================
// Modules
// ============================================================================

/// Session facade and configuration.
///
/// Use [`ObsRemote::builder()`] to create a configured client.
pub mod client;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Application-facing events.
///
/// Server updates and socket lifecycle changes are published under an
/// [`EventName`].
pub mod events;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing request and subscription IDs.
pub mod identifiers;

/// obs-websocket protocol message types.
pub mod protocol;

/// WebSocket transport and request correlation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{ClientBuilder, ClientConfig, ConnectInfo, ObsRemote, SessionState};

// Error types
pub use error::{Error, Result};

// Event types
pub use events::{EventBus, EventEmitter, EventName, Listener};

// Identifier types
pub use identifiers::{MessageId, SubscriptionId};

// Protocol types
pub use protocol::{Command, Reply, ReplyStatus, Update, UpdateKind};

// Transport types
pub use transport::CloseEvent;
