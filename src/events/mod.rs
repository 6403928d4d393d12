//! Application-facing events.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `bus` | Event names and the publish/subscribe capability |
//! | `router` | Server update → event name mapping |

// ============================================================================
// Submodules
// ============================================================================

/// Event names and the publish/subscribe capability.
pub mod bus;

/// Server update routing.
pub mod router;

// ============================================================================
// Re-exports
// ============================================================================

pub use bus::{EventBus, EventEmitter, EventName, Listener};
pub use router::{event_for, route};
