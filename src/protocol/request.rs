//! Request and Reply message types.
//!
//! Requests are plain JSON objects carrying a `request-type` tag; the
//! correlator stamps each with a `message-id` right before it is sent.
//! Replies echo that identifier along with a `status` marker.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, to_string, to_value};

use crate::error::{Error, Result};
use crate::identifiers::MessageId;

use super::{MESSAGE_ID_FIELD, REQUEST_TYPE_FIELD, STATUS_FIELD};

// ============================================================================
// Request
// ============================================================================

/// An outbound request body.
///
/// # Format
///
/// ```json
/// {
///   "request-type": "SetCurrentScene",
///   "message-id": "7",
///   "scene-name": "Scene A"
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    body: Map<String, Value>,
}

impl Request {
    /// Builds a request from any value serializing to a JSON object.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if serialization fails
    /// - [`Error::Protocol`] if the value is not an object
    pub fn from_body(body: impl Serialize) -> Result<Self> {
        match to_value(body)? {
            Value::Object(body) => Ok(Self { body }),
            other => Err(Error::protocol(format!(
                "Request body must be a JSON object, got {other}"
            ))),
        }
    }

    /// Returns the `request-type` tag, if present.
    #[inline]
    #[must_use]
    pub fn request_type(&self) -> Option<&str> {
        self.body.get(REQUEST_TYPE_FIELD).and_then(Value::as_str)
    }

    /// Stamps the identifier and serializes to a text frame.
    ///
    /// An identifier already present in the body is overwritten.
    pub(crate) fn encode(mut self, id: MessageId) -> Result<String> {
        self.body
            .insert(MESSAGE_ID_FIELD.to_string(), Value::String(id.to_string()));
        Ok(to_string(&self.body)?)
    }
}

// ============================================================================
// Reply
// ============================================================================

/// A reply from the server.
///
/// Keeps the complete payload; accessor helpers read the common fields.
///
/// # Format
///
/// Success:
/// ```json
/// { "message-id": "1", "status": "ok", "obs-websocket-version": "4.8.0" }
/// ```
///
/// Error:
/// ```json
/// { "message-id": "2", "status": "error", "error": "requested scene does not exist" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Reply(Map<String, Value>);

impl Reply {
    /// Wraps a decoded object.
    #[inline]
    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Builds a reply from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the value is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::protocol(format!(
                "Reply must be a JSON object, got {other}"
            ))),
        }
    }

    /// The echoed `message-id`, if present and a string.
    #[inline]
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.get_str(MESSAGE_ID_FIELD)
    }

    /// The reply status. Anything other than `"error"` counts as success.
    #[inline]
    #[must_use]
    pub fn status(&self) -> ReplyStatus {
        match self.get_str(STATUS_FIELD) {
            Some("error") => ReplyStatus::Error,
            _ => ReplyStatus::Ok,
        }
    }

    /// Returns `true` if the server reported a failure.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status() == ReplyStatus::Error
    }

    /// The server's error message, if any.
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.get_str("error")
    }

    /// Gets a raw field.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Gets a string field by reference.
    #[inline]
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Gets a string field.
    ///
    /// Returns empty string if key not found or not a string.
    #[inline]
    #[must_use]
    pub fn get_string(&self, key: &str) -> String {
        self.get_str(key).unwrap_or_default().to_string()
    }

    /// Gets a boolean field.
    ///
    /// Returns false if key not found or not a boolean.
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> bool {
        self.0
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    /// Gets a numeric field.
    ///
    /// Returns 0 if key not found or not an unsigned integer.
    #[inline]
    #[must_use]
    pub fn get_u64(&self, key: &str) -> u64 {
        self.0
            .get(key)
            .and_then(Value::as_u64)
            .unwrap_or_default()
    }

    /// Borrows the full payload.
    #[inline]
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the reply into a JSON value.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

// ============================================================================
// ReplyStatus
// ============================================================================

/// Reply status discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyStatus {
    /// Anything other than `"error"`.
    Ok,
    /// `"status": "error"`.
    Error,
}

// ============================================================================
// Tests
// ============================================================================
