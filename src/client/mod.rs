//! High-level client.
//!
//! [`ObsRemote`] is the entry point: connect, log in, send requests and
//! listen for events.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `auth` | Challenge-response hashing |
//! | `builder` | Fluent client construction |
//! | `config` | Host, port and debug settings |
//! | `core` | Session lifecycle and events |
//! | `requests` | Typed request methods |

// ============================================================================
// Submodules
// ============================================================================

/// Challenge-response hashing.
pub mod auth;

/// Fluent client construction.
pub mod builder;

/// Connection settings.
pub mod config;

/// Session lifecycle and events.
mod core;

/// Typed request methods.
mod requests;

// ============================================================================
// Re-exports
// ============================================================================

pub use auth::challenge_response;
pub use builder::ClientBuilder;
pub use config::{ClientConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use self::core::{ConnectInfo, ObsRemote, SessionState};
