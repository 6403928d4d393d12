//! obs-websocket protocol message types.
//!
//! This module defines the JSON messages exchanged with the server.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Client → Server | Remote procedure call |
//! | `Reply` | Server → Client | Result of a request |
//! | `Update` | Server → Client | Unsolicited notification |
//!
//! Requests carry `request-type` and `message-id`. Replies echo the
//! `message-id` with a `status`. Updates carry `update-type` and never a
//! `message-id`.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Typed request bodies |
//! | `event` | Update messages and kinds |
//! | `frame` | Inbound decoding and classification |
//! | `request` | Request and Reply types |

// ============================================================================
// Submodules
// ============================================================================

/// Typed request bodies.
pub mod command;

/// Server-pushed update types.
pub mod event;

/// Inbound frame classification.
pub mod frame;

/// Request and Reply message types.
pub mod request;

// ============================================================================
// Field Names
// ============================================================================

/// Reserved field carrying the request correlator.
pub const MESSAGE_ID_FIELD: &str = "message-id";

/// Operation tag on outbound requests.
pub const REQUEST_TYPE_FIELD: &str = "request-type";

/// Event tag on server-pushed updates.
pub const UPDATE_TYPE_FIELD: &str = "update-type";

/// Reply status marker.
pub const STATUS_FIELD: &str = "status";

// ============================================================================
// Re-exports
// ============================================================================

pub use command::Command;
pub use event::{Update, UpdateKind};
pub use frame::{Inbound, decode_object};
pub use request::{Reply, ReplyStatus, Request};
