//! Inbound frame decoding and classification.

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Map, Value, from_str};

use crate::error::{Error, Result};

use super::{Reply, UPDATE_TYPE_FIELD, Update};

// ============================================================================
// Inbound
// ============================================================================

/// A decoded server message.
///
/// A frame carrying a string `update-type` is an [`Update`]; every other
/// object is treated as a [`Reply`], whether or not it has a `message-id`.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Answer to a request.
    Reply(Reply),
    /// Server-pushed notification.
    Update(Update),
}

impl Inbound {
    /// Decodes and classifies a text frame.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the text is not JSON
    /// - [`Error::Protocol`] if the JSON is not an object
    pub fn decode(text: &str) -> Result<Self> {
        decode_object(text).map(Self::classify)
    }

    /// Classifies an already decoded object.
    #[must_use]
    pub fn classify(object: Map<String, Value>) -> Self {
        let update_type = match object.get(UPDATE_TYPE_FIELD) {
            Some(Value::String(tag)) => Some(tag.clone()),
            _ => None,
        };

        match update_type {
            Some(tag) => Self::Update(Update::new(tag, object)),
            None => Self::Reply(Reply::from_map(object)),
        }
    }
}

/// Decodes a text frame into a JSON object.
///
/// # Errors
///
/// - [`Error::Json`] if the text is not JSON
/// - [`Error::Protocol`] if the JSON is not an object
pub fn decode_object(text: &str) -> Result<Map<String, Value>> {
    match from_str::<Value>(text)? {
        Value::Object(object) => Ok(object),
        other => Err(Error::protocol(format!(
            "Frame is not a JSON object: {other}"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================
