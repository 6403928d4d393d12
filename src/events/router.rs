//! Maps server updates onto application events.

// ============================================================================
// Imports
// ============================================================================

use tracing::trace;

use crate::protocol::{Update, UpdateKind};

use super::{EventEmitter, EventName};

// ============================================================================
// Routing
// ============================================================================

/// Event published for an update kind.
#[must_use]
pub const fn event_for(kind: UpdateKind) -> EventName {
    match kind {
        UpdateKind::StreamStatus => EventName::StreamStatus,
        UpdateKind::StreamStarting => EventName::StreamStart,
        UpdateKind::StreamStopping => EventName::StreamStop,
        UpdateKind::SwitchScenes => EventName::ScenesSwitch,
        UpdateKind::ScenesChanged => EventName::ScenesChange,
        UpdateKind::SourceOrderChanged => EventName::SourcesOrder,
        UpdateKind::SourceChanged => EventName::SourceChange,
        UpdateKind::RepopulateSources => EventName::SourceRepopulate,
        UpdateKind::VolumeChanged => EventName::VolumeChange,
    }
}

/// Publishes an update under its application event name.
///
/// Unknown update types are ignored so newer servers keep working.
/// Returns the event that was published, if any.
pub fn route(update: Update, emitter: &dyn EventEmitter) -> Option<EventName> {
    let Some(kind) = update.kind() else {
        trace!(update_type = update.update_type(), "Ignoring unknown update");
        return None;
    };

    let event = event_for(kind);
    emitter.publish(event, &update.into_value());
    Some(event)
}

// ============================================================================
// Tests
// ============================================================================
