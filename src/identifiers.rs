//! Type-safe identifier wrappers.
//!
//! Newtypes keep request correlators and listener handles from being mixed
//! up with plain integers.
//!
//! | Type | Wire form | Purpose |
//! |------|-----------|---------|
//! | [`MessageId`] | `"message-id": "42"` | Request/reply correlation |
//! | [`SubscriptionId`] | - | Handle for removing an event listener |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Serialize, Serializer};

// ============================================================================
// MessageId
// ============================================================================

/// Correlator attached to every outbound request.
///
/// Identifiers start at 1 and grow by one per request for the lifetime of a
/// client. On the wire they travel as decimal strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl MessageId {
    /// The first identifier issued by a fresh client.
    pub const FIRST: Self = Self(1);

    /// Wraps a raw value.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Parses the wire form.
    ///
    /// Only the canonical decimal rendering is accepted, so `"007"` or
    /// `"+7"` never match identifier 7.
    #[must_use]
    pub fn from_wire(text: &str) -> Option<Self> {
        let value: u64 = text.parse().ok()?;
        (value.to_string() == text).then_some(Self(value))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for MessageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// SubscriptionId
// ============================================================================

/// Handle returned when registering an event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[inline]
    pub(crate) const fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
