//! WebSocket transport and request correlation.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐                           ┌──────────────────┐
//! │  ObsRemote       │                           │  obs-websocket   │
//! │                  │         WebSocket         │  (OBS plugin)    │
//! │  Correlator      │◄─────────────────────────►│                  │
//! │  → Socket        │      ws://host:port       │                  │
//! └──────────────────┘                           └──────────────────┘
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Correlator::signal_handler` - Reserve an epoch and a handler
//! 2. `Socket::open` - Connect; returns the socket and its driver
//! 3. `Correlator::attach` - Route new requests to the socket
//! 4. `SocketDriver::start` - Signal `Opened` and run the event loop
//! 5. `Correlator::send_request` - Send requests, receive replies
//! 6. `Correlator::detach` / `close` - Retire the socket
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `correlation` | Request/reply matching and inbound dispatch |
//! | `socket` | WebSocket adapter and event loop |

// ============================================================================
// Submodules
// ============================================================================

/// Request/reply matching and inbound dispatch.
pub mod correlation;

/// WebSocket adapter and event loop.
pub mod socket;

/// In-process obs-websocket server for tests.
#[cfg(test)]
pub(crate) mod mock;

// ============================================================================
// Re-exports
// ============================================================================

pub use correlation::{Correlator, FRAME_LOG_TARGET};
pub use socket::{
    CLOSE_ABNORMAL, CLOSE_NO_STATUS, CLOSE_NORMAL, CloseEvent, SignalHandler, Socket,
    SocketDriver, SocketSignal,
};
